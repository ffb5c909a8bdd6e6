//! Platform domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::visibility::Visibility;

/// A carrier structure (mast, station, vessel, ...) that devices and
/// other platforms are mounted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: Uuid,
    pub short_name: String,
    pub long_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer_name: Option<String>,
    pub model: Option<String>,
    pub group_ids: Vec<String>,
    pub visibility: Visibility,
    pub archived: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlatform {
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
pub struct UpdatePlatform {
    pub short_name: Option<String>,
    pub long_name: Option<Option<String>>,
    pub serial_number: Option<Option<String>>,
    pub manufacturer_name: Option<Option<String>>,
    pub model: Option<Option<String>>,
    pub group_ids: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
}
