//! Measured property of a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quantity measured by a device. Dynamic location actions derive
/// their coordinates from up to three device properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProperty {
    pub id: Uuid,
    pub device_id: Uuid,
    pub property_name: String,
    pub label: Option<String>,
    pub unit_name: Option<String>,
    pub resolution: Option<f64>,
    pub accuracy: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceProperty {
    pub device_id: Uuid,
    pub property_name: String,
    pub label: Option<String>,
    pub unit_name: Option<String>,
    pub resolution: Option<f64>,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDeviceProperty {
    pub property_name: Option<String>,
    pub label: Option<Option<String>>,
    pub unit_name: Option<Option<String>>,
    pub resolution: Option<Option<f64>>,
    pub accuracy: Option<Option<f64>>,
}
