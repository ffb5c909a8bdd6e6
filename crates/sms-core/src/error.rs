//! Error types for the sensor management system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SmsError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// HTTP status code used when the error crosses the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Validation { .. } => 422,
            Self::AuthenticationFailed { .. } => 401,
            Self::AuthorizationDenied { .. } => 403,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

pub type SmsResult<T> = Result<T, SmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_http_semantics() {
        assert_eq!(SmsError::not_found("device", "x").status_code(), 404);
        assert_eq!(SmsError::conflict("overlap").status_code(), 409);
        assert_eq!(SmsError::validation("label").status_code(), 422);
        assert_eq!(
            SmsError::AuthenticationFailed {
                reason: "no token".into()
            }
            .status_code(),
            401
        );
        assert_eq!(
            SmsError::AuthorizationDenied {
                reason: "not a member".into()
            }
            .status_code(),
            403
        );
        assert_eq!(SmsError::Database("down".into()).status_code(), 500);
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = SmsError::not_found("configuration", 42);
        assert_eq!(
            err.to_string(),
            "Entity not found: configuration with id 42"
        );
    }
}
