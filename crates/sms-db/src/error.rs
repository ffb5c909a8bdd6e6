//! Database-specific error types and conversions.

use sms_core::error::SmsError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{0}")]
    Conflict(String),
}

impl DbError {
    /// Classify an error reported by `Response::check`.
    ///
    /// Unique-index violations become conflicts, everything else a
    /// failed query.
    pub(crate) fn from_check(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Conflict(message)
        } else {
            DbError::Query(message)
        }
    }
}

impl From<DbError> for SmsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SmsError::NotFound { entity, id },
            DbError::Conflict(message) => SmsError::Conflict { message },
            other => SmsError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_keep_their_status() {
        let err: SmsError = DbError::Conflict("label taken".into()).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn decode_failures_are_database_errors() {
        let err: SmsError = DbError::Decode("invalid UUID".into()).into();
        assert!(matches!(err, SmsError::Database(_)));
    }
}
