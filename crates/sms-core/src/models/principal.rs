//! The authenticated caller of an operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity handed to the core by the (external) authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    /// Stable subject identifier from the identity provider.
    pub subject: String,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            subject: subject.into(),
            is_superuser: false,
        }
    }

    pub fn superuser(subject: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::new(subject)
        }
    }
}
