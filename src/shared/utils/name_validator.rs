use regex::Regex;
use std::sync::OnceLock;

use crate::domain::errors::{DomainError, DomainResult};

const MAX_NAME_CHARS: usize = 64;

fn service_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Zа-яА-ЯёЁ\s-]+$").expect("service name pattern compiles")
    })
}

/// Trims and checks a service name: Latin or Cyrillic letters, spaces and hyphens.
pub fn validate_service_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DomainError::Validation(
            "Service name cannot be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(DomainError::Validation(format!(
            "Service name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }

    if !service_name_pattern().is_match(trimmed) {
        return Err(DomainError::Validation(
            "Service name may only contain letters, spaces and hyphens".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Non-empty free text, trimmed.
pub fn require_text(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}
