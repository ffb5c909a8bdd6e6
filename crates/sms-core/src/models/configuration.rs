//! Configuration domain model.
//!
//! A configuration is the scheduling domain for mount and location
//! actions: overlap rules for locations are evaluated per
//! configuration, and archiving a configuration freezes all of its
//! actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::visibility::Visibility;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConfigurationStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl ConfigurationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(Self::Draft),
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub id: Uuid,
    /// Unique human-readable label.
    pub label: String,
    pub description: Option<String>,
    pub status: ConfigurationStatus,
    /// Permission group whose members may edit the configuration.
    /// `None` means every authenticated user may.
    pub permission_group: Option<String>,
    pub visibility: Visibility,
    pub archived: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConfiguration {
    pub label: String,
    pub description: Option<String>,
    pub status: ConfigurationStatus,
    pub permission_group: Option<String>,
    pub visibility: Visibility,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateConfiguration {
    pub label: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ConfigurationStatus>,
    pub permission_group: Option<Option<String>>,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
}
