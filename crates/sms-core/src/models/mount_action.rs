//! Mount action domain models.
//!
//! A mount action asserts that a device or platform is attached to a
//! configuration (and optionally to a parent platform inside it) for
//! a time interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval::{Interval, Scheduled, UpperBound};

/// Device attached to a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceMountAction {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub device_id: Uuid,
    pub parent_platform_id: Option<Uuid>,
    pub begin_date: DateTime<Utc>,
    /// `None` while the device is still mounted.
    pub end_date: Option<DateTime<Utc>>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub begin_contact: String,
    pub end_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceMountAction {
    pub configuration_id: Uuid,
    pub device_id: Uuid,
    pub parent_platform_id: Option<Uuid>,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub begin_contact: String,
    pub end_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDeviceMountAction {
    pub configuration_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub parent_platform_id: Option<Option<Uuid>>,
    pub begin_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub offset_z: Option<f64>,
    pub begin_description: Option<Option<String>>,
    pub end_description: Option<Option<String>>,
    pub begin_contact: Option<String>,
    pub end_contact: Option<Option<String>>,
}

impl Scheduled for DeviceMountAction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn interval(&self) -> Interval {
        Interval::from_bounds(self.begin_date, UpperBound::from_option(self.end_date))
    }
}

/// Platform attached to a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMountAction {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub platform_id: Uuid,
    pub parent_platform_id: Option<Uuid>,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub begin_contact: String,
    pub end_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlatformMountAction {
    pub configuration_id: Uuid,
    pub platform_id: Uuid,
    pub parent_platform_id: Option<Uuid>,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub offset_z: f64,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub begin_contact: String,
    pub end_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePlatformMountAction {
    pub configuration_id: Option<Uuid>,
    pub platform_id: Option<Uuid>,
    pub parent_platform_id: Option<Option<Uuid>>,
    pub begin_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub offset_x: Option<f64>,
    pub offset_y: Option<f64>,
    pub offset_z: Option<f64>,
    pub begin_description: Option<Option<String>>,
    pub end_description: Option<Option<String>>,
    pub begin_contact: Option<String>,
    pub end_contact: Option<Option<String>>,
}

impl Scheduled for PlatformMountAction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn interval(&self) -> Interval {
        Interval::from_bounds(self.begin_date, UpperBound::from_option(self.end_date))
    }
}
