//! Location action domain models.
//!
//! Static and dynamic location actions both define where a
//! configuration was located; together they must never overlap within
//! one configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval::{Interval, Scheduled, UpperBound};

/// Fixed coordinates for a configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticLocationAction {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub epsg_code: Option<String>,
    pub elevation_datum_name: Option<String>,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStaticLocationAction {
    pub configuration_id: Uuid,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub epsg_code: Option<String>,
    pub elevation_datum_name: Option<String>,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateStaticLocationAction {
    pub configuration_id: Option<Uuid>,
    pub begin_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub x: Option<Option<f64>>,
    pub y: Option<Option<f64>>,
    pub z: Option<Option<f64>>,
    pub epsg_code: Option<Option<String>>,
    pub elevation_datum_name: Option<Option<String>>,
    pub begin_description: Option<Option<String>>,
    pub end_description: Option<Option<String>>,
}

impl Scheduled for StaticLocationAction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn interval(&self) -> Interval {
        Interval::from_bounds(self.begin_date, UpperBound::from_option(self.end_date))
    }
}

/// Coordinates read from the time series of mounted device properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicLocationAction {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub x_property_id: Option<Uuid>,
    pub y_property_id: Option<Uuid>,
    pub z_property_id: Option<Uuid>,
    pub epsg_code: Option<String>,
    pub elevation_datum_name: Option<String>,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DynamicLocationAction {
    pub fn property_refs(&self) -> PropertyRefs {
        PropertyRefs {
            x: self.x_property_id,
            y: self.y_property_id,
            z: self.z_property_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDynamicLocationAction {
    pub configuration_id: Uuid,
    pub begin_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub x_property_id: Option<Uuid>,
    pub y_property_id: Option<Uuid>,
    pub z_property_id: Option<Uuid>,
    pub epsg_code: Option<String>,
    pub elevation_datum_name: Option<String>,
    pub begin_description: Option<String>,
    pub end_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDynamicLocationAction {
    pub configuration_id: Option<Uuid>,
    pub begin_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub x_property_id: Option<Option<Uuid>>,
    pub y_property_id: Option<Option<Uuid>>,
    pub z_property_id: Option<Option<Uuid>>,
    pub epsg_code: Option<Option<String>>,
    pub elevation_datum_name: Option<Option<String>>,
    pub begin_description: Option<Option<String>>,
    pub end_description: Option<Option<String>>,
}

impl Scheduled for DynamicLocationAction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn interval(&self) -> Interval {
        Interval::from_bounds(self.begin_date, UpperBound::from_option(self.end_date))
    }
}

/// The x/y/z property references of a dynamic location action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyRefs {
    pub x: Option<Uuid>,
    pub y: Option<Uuid>,
    pub z: Option<Uuid>,
}

impl PropertyRefs {
    /// Non-null references paired with their relationship name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Uuid)> {
        [
            ("x_property", self.x),
            ("y_property", self.y),
            ("z_property", self.z),
        ]
        .into_iter()
        .filter_map(|(name, id)| id.map(|id| (name, id)))
    }
}

/// A location action of either kind, used where both share a rule.
#[derive(Debug, Clone)]
pub enum LocationAction {
    Static(StaticLocationAction),
    Dynamic(DynamicLocationAction),
}

impl LocationAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "static location action",
            Self::Dynamic(_) => "dynamic location action",
        }
    }
}

impl Scheduled for LocationAction {
    fn id(&self) -> Uuid {
        match self {
            Self::Static(action) => action.id,
            Self::Dynamic(action) => action.id,
        }
    }

    fn interval(&self) -> Interval {
        match self {
            Self::Static(action) => action.interval(),
            Self::Dynamic(action) => action.interval(),
        }
    }
}
