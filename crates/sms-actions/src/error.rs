//! Validation failures raised while checking actions.

use sms_core::error::SmsError;
use sms_core::interval::InvertedInterval;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ActionError {
    /// Another action already occupies part of the requested interval.
    #[error("{subject} overlaps existing {existing_kind} {existing_id}")]
    Overlap {
        subject: String,
        existing_kind: &'static str,
        existing_id: Uuid,
    },

    /// A referenced resource is not mounted for the whole interval.
    #[error(
        "{relation} {target_id} is not mounted in configuration \
         {configuration_id} for the whole time range"
    )]
    NotCovered {
        relation: &'static str,
        target_id: Uuid,
        configuration_id: Uuid,
    },

    #[error("{entity} {id} is archived")]
    Archived { entity: &'static str, id: Uuid },

    #[error("{0}")]
    NotPermitted(String),

    #[error(transparent)]
    InvalidInterval(#[from] InvertedInterval),

    #[error("platform {0} cannot be mounted on itself")]
    SelfParent(Uuid),

    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("{0}")]
    InvalidInput(String),
}

impl From<ActionError> for SmsError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Overlap { .. }
            | ActionError::NotCovered { .. }
            | ActionError::Archived { .. } => SmsError::Conflict {
                message: err.to_string(),
            },
            ActionError::NotPermitted(reason) => SmsError::AuthorizationDenied { reason },
            ActionError::InvalidInterval(_)
            | ActionError::SelfParent(_)
            | ActionError::MissingField(_)
            | ActionError::InvalidInput(_) => SmsError::Validation {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn overlap_is_a_conflict_naming_the_record() {
        let existing_id = Uuid::new_v4();
        let err: SmsError = ActionError::Overlap {
            subject: "device mount".into(),
            existing_kind: "device mount action",
            existing_id,
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains(&existing_id.to_string()));
    }

    #[test]
    fn missing_coverage_names_the_relationship() {
        let err: SmsError = ActionError::NotCovered {
            relation: "y_property",
            target_id: Uuid::new_v4(),
            configuration_id: Uuid::new_v4(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("y_property"));
    }

    #[test]
    fn permission_and_input_errors_keep_their_status() {
        let denied: SmsError = ActionError::NotPermitted("not a member".into()).into();
        assert_eq!(denied.status_code(), 403);

        let at = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let invalid: SmsError = ActionError::from(InvertedInterval { begin: at, end: at }).into();
        assert_eq!(invalid.status_code(), 422);

        let archived: SmsError = ActionError::Archived {
            entity: "configuration",
            id: Uuid::new_v4(),
        }
        .into();
        assert_eq!(archived.status_code(), 409);
    }
}
