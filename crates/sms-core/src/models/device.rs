//! Device domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::visibility::Visibility;

/// A physical instrument (sensor, logger, ...) that can be mounted
/// in a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub short_name: String,
    pub long_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer_name: Option<String>,
    pub model: Option<String>,
    /// Permission groups allowed to edit the device.
    pub group_ids: Vec<String>,
    pub visibility: Visibility,
    pub archived: bool,
    /// Subject of the user that created the device.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDevice {
    pub short_name: String,
    pub long_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer_name: Option<String>,
    pub model: Option<String>,
    pub group_ids: Vec<String>,
    pub visibility: Visibility,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDevice {
    pub short_name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub long_name: Option<Option<String>>,
    pub serial_number: Option<Option<String>>,
    pub manufacturer_name: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub group_ids: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
}
