use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    New,
    InProgress,
    Closed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Closed => "closed",
        }
    }

    /// Status only moves forward; a closed request is never reopened.
    pub fn advance_to(self, next: FeedbackStatus) -> DomainResult<FeedbackStatus> {
        use FeedbackStatus::*;

        match (self, next) {
            (New, InProgress) | (New, Closed) | (InProgress, Closed) => Ok(next),
            // A second admin reply keeps the request in progress
            (InProgress, InProgress) => Ok(next),
            (from, to) => Err(DomainError::Conflict(format!(
                "feedback request cannot move from {} to {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

impl std::str::FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(FeedbackStatus::New),
            "in_progress" => Ok(FeedbackStatus::InProgress),
            "closed" => Ok(FeedbackStatus::Closed),
            _ => Err(format!("Invalid feedback status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub status: FeedbackStatus,
    pub admin_response: Option<String>,
    pub created_at: String,
}
