//! SurrealDB implementation of [`DevicePropertyRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::device_property::{
    CreateDeviceProperty, DeviceProperty, UpdateDeviceProperty,
};
use sms_core::repository::DevicePropertyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_count, parse_uuid};
use crate::error::DbError;

const SELECT_ONE: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('device_property', $id)";

#[derive(Debug, SurrealValue)]
struct DevicePropertyRow {
    record_id: String,
    device_id: String,
    property_name: String,
    label: Option<String>,
    unit_name: Option<String>,
    resolution: Option<f64>,
    accuracy: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DevicePropertyRow {
    fn try_into_property(self) -> Result<DeviceProperty, DbError> {
        Ok(DeviceProperty {
            id: parse_uuid("device_property", &self.record_id)?,
            device_id: parse_uuid("device", &self.device_id)?,
            property_name: self.property_name,
            label: self.label,
            unit_name: self.unit_name,
            resolution: self.resolution,
            accuracy: self.accuracy,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<DevicePropertyRow>, id: String) -> Result<DeviceProperty, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "device_property".into(),
            id,
        })?
        .try_into_property()
}

/// SurrealDB implementation of the DeviceProperty repository.
#[derive(Clone)]
pub struct SurrealDevicePropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDevicePropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DevicePropertyRepository for SurrealDevicePropertyRepository<C> {
    async fn create(&self, input: CreateDeviceProperty) -> SmsResult<DeviceProperty> {
        let id_str = Uuid::new_v4().to_string();
        let device_id_str = input.device_id.to_string();

        // The owning device must exist.
        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM device \
                 WHERE id = type::record('device', $device_id) GROUP ALL",
            )
            .bind(("device_id", device_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let devices: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if first_count(devices) == 0 {
            return Err(DbError::NotFound {
                entity: "device".into(),
                id: device_id_str,
            }
            .into());
        }

        let query = format!(
            "CREATE type::record('device_property', $id) SET \
             device_id = $device_id, property_name = $property_name, \
             label = $label, unit_name = $unit_name, \
             resolution = $resolution, accuracy = $accuracy; \
             {SELECT_ONE};"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("device_id", device_id_str))
            .bind(("property_name", input.property_name))
            .bind(("label", input.label))
            .bind(("unit_name", input.unit_name))
            .bind(("resolution", input.resolution))
            .bind(("accuracy", input.accuracy))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DevicePropertyRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<DeviceProperty> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DevicePropertyRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateDeviceProperty) -> SmsResult<DeviceProperty> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.property_name.is_some() {
            sets.push("property_name = $property_name");
        }
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.unit_name.is_some() {
            sets.push("unit_name = $unit_name");
        }
        if input.resolution.is_some() {
            sets.push("resolution = $resolution");
        }
        if input.accuracy.is_some() {
            sets.push("accuracy = $accuracy");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('device_property', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(property_name) = input.property_name {
            builder = builder.bind(("property_name", property_name));
        }
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(unit_name) = input.unit_name {
            builder = builder.bind(("unit_name", unit_name));
        }
        if let Some(resolution) = input.resolution {
            builder = builder.bind(("resolution", resolution));
        }
        if let Some(accuracy) = input.accuracy {
            builder = builder.bind(("accuracy", accuracy));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DevicePropertyRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;
        let id_str = id.to_string();

        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM dynamic_location_action \
                 WHERE x_property_id = $id OR y_property_id = $id \
                 OR z_property_id = $id GROUP ALL",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let refs: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if first_count(refs) > 0 {
            return Err(DbError::Conflict(format!(
                "device property {id_str} is used by dynamic location actions"
            ))
            .into());
        }

        self.db
            .query("DELETE type::record('device_property', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn list_by_device(&self, device_id: Uuid) -> SmsResult<Vec<DeviceProperty>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM device_property \
                 WHERE device_id = $device_id \
                 ORDER BY property_name ASC",
            )
            .bind(("device_id", device_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DevicePropertyRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(DevicePropertyRow::try_into_property)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
