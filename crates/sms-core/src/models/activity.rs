//! Activity log domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    Create,
    Update,
    Delete,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Create" => Some(Self::Create),
            "Update" => Some(Self::Update),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    /// Subject of the user that performed the change.
    pub actor: String,
    pub action: ActivityKind,
    /// Entity type, e.g. `device_mount_action`.
    pub entity: String,
    pub entity_id: Uuid,
    pub configuration_id: Option<Uuid>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityLogEntry {
    pub actor: String,
    pub action: ActivityKind,
    pub entity: String,
    pub entity_id: Uuid,
    pub configuration_id: Option<Uuid>,
    pub description: String,
}

/// Number of log entries recorded on one UTC day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyActivityCount {
    pub date: NaiveDate,
    pub count: u64,
}
