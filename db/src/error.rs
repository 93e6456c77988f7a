use std::borrow::Cow;

use thiserror::Error;
use uuid::Uuid;

use crate::validation::Rejection;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("step number {requested} is out of range, the recipe has {max} steps")]
    OutOfRange { requested: i32, max: i32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    ValidationFailed(#[from] Rejection),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &str, id: Uuid) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound("requested row".to_string());
        }

        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(Cow::into_owned);

        match code.as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => Self::NotFound(err.to_string()),
            Some(UNIQUE_VIOLATION | SERIALIZATION_FAILURE | DEADLOCK_DETECTED) => {
                Self::Conflict(err.to_string())
            }
            _ => Self::StoreUnavailable(err),
        }
    }
}

/// Rejects empty or whitespace-only text before it reaches a statement.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid(format!("{field} must not be empty")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn transport_errors_are_store_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::StoreUnavailable(_)));

        let err = StoreError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::StoreUnavailable(_)));
    }

    #[test]
    fn out_of_range_message_names_both_positions() {
        let err = StoreError::OutOfRange {
            requested: 5,
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "step number 5 is out of range, the recipe has 4 steps"
        );
    }

    #[test]
    fn require_text_rejects_blank_values() {
        assert!(require_text("name", "Caesar").is_ok());
        assert!(matches!(
            require_text("name", "   "),
            Err(StoreError::InvalidArgument(_))
        ));
    }
}
