use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Ownership(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Every failure except bad user input is broadcast to admins.
    pub fn is_alertable(&self) -> bool {
        !matches!(self, DomainError::Validation(_))
    }

    /// Short text shown to the user who triggered the failure.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation(msg) => format!("❌ {}", msg),
            DomainError::NotFound(msg) => format!("❌ Sorry, {} was not found.", msg),
            DomainError::Conflict(msg) => {
                format!("⚠️ Sorry, {}. Please pick another option and try again.", msg)
            }
            DomainError::Ownership(_) => {
                "⛔ Sorry, you are not allowed to do that.".to_string()
            }
            DomainError::Persistence(_) => {
                "❌ Sorry, something went wrong on our side. Please send /reset and start again."
                    .to_string()
            }
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound("record".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    if message.contains("slots") {
                        DomainError::Conflict("such a slot already exists".to_string())
                    } else if message.contains("bookings") {
                        DomainError::Conflict("this slot is already booked".to_string())
                    } else {
                        DomainError::Conflict("this record already exists".to_string())
                    }
                } else {
                    DomainError::Persistence(format!("Database error: {}", message))
                }
            }
            other => DomainError::Persistence(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DomainError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DomainError::Persistence(format!("Migration failed: {}", err))
    }
}
