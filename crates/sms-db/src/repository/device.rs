//! SurrealDB implementation of [`DeviceRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::device::{CreateDevice, Device, UpdateDevice};
use sms_core::models::visibility::Visibility;
use sms_core::repository::{DeviceRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_count, parse_uuid};
use crate::error::DbError;

const SELECT_ONE: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('device', $id)";

#[derive(Debug, SurrealValue)]
struct DeviceRow {
    record_id: String,
    short_name: String,
    long_name: Option<String>,
    serial_number: Option<String>,
    manufacturer_name: Option<String>,
    model: Option<String>,
    group_ids: Vec<String>,
    visibility: String,
    archived: bool,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeviceRow {
    fn try_into_device(self) -> Result<Device, DbError> {
        let visibility = Visibility::parse(&self.visibility)
            .ok_or_else(|| DbError::Decode(format!("unknown visibility: {}", self.visibility)))?;
        Ok(Device {
            id: parse_uuid("device", &self.record_id)?,
            short_name: self.short_name,
            long_name: self.long_name,
            serial_number: self.serial_number,
            manufacturer_name: self.manufacturer_name,
            model: self.model,
            group_ids: self.group_ids,
            visibility,
            archived: self.archived,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<DeviceRow>, id: String) -> Result<Device, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "device".into(),
            id,
        })?
        .try_into_device()
}

/// SurrealDB implementation of the Device repository.
#[derive(Clone)]
pub struct SurrealDeviceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDeviceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DeviceRepository for SurrealDeviceRepository<C> {
    async fn create(&self, input: CreateDevice) -> SmsResult<Device> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('device', $id) SET \
             short_name = $short_name, long_name = $long_name, \
             serial_number = $serial_number, \
             manufacturer_name = $manufacturer_name, model = $model, \
             group_ids = $group_ids, visibility = $visibility, \
             created_by = $created_by; \
             {SELECT_ONE};"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("short_name", input.short_name))
            .bind(("long_name", input.long_name))
            .bind(("serial_number", input.serial_number))
            .bind(("manufacturer_name", input.manufacturer_name))
            .bind(("model", input.model))
            .bind(("group_ids", input.group_ids))
            .bind(("visibility", input.visibility.as_str()))
            .bind(("created_by", input.created_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DeviceRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<Device> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeviceRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateDevice) -> SmsResult<Device> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.short_name.is_some() {
            sets.push("short_name = $short_name");
        }
        if input.long_name.is_some() {
            sets.push("long_name = $long_name");
        }
        if input.serial_number.is_some() {
            sets.push("serial_number = $serial_number");
        }
        if input.manufacturer_name.is_some() {
            sets.push("manufacturer_name = $manufacturer_name");
        }
        if input.model.is_some() {
            sets.push("model = $model");
        }
        if input.group_ids.is_some() {
            sets.push("group_ids = $group_ids");
        }
        if input.visibility.is_some() {
            sets.push("visibility = $visibility");
        }
        if input.archived.is_some() {
            sets.push("archived = $archived");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('device', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(short_name) = input.short_name {
            builder = builder.bind(("short_name", short_name));
        }
        if let Some(long_name) = input.long_name {
            builder = builder.bind(("long_name", long_name));
        }
        if let Some(serial_number) = input.serial_number {
            builder = builder.bind(("serial_number", serial_number));
        }
        if let Some(manufacturer_name) = input.manufacturer_name {
            builder = builder.bind(("manufacturer_name", manufacturer_name));
        }
        if let Some(model) = input.model {
            builder = builder.bind(("model", model));
        }
        if let Some(group_ids) = input.group_ids {
            builder = builder.bind(("group_ids", group_ids));
        }
        if let Some(visibility) = input.visibility {
            builder = builder.bind(("visibility", visibility.as_str()));
        }
        if let Some(archived) = input.archived {
            builder = builder.bind(("archived", archived));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DeviceRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;
        let id_str = id.to_string();

        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM device_mount_action \
                 WHERE device_id = $id GROUP ALL; \
                 SELECT VALUE meta::id(id) FROM device_property \
                 WHERE device_id = $id;",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mounts: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if first_count(mounts) > 0 {
            return Err(DbError::Conflict(format!(
                "device {id_str} is still referenced by mount actions"
            ))
            .into());
        }

        let property_ids: Vec<String> = check.take(1).map_err(DbError::from)?;
        if !property_ids.is_empty() {
            let mut refs = self
                .db
                .query(
                    "SELECT count() AS total FROM dynamic_location_action \
                     WHERE x_property_id IN $ids OR y_property_id IN $ids \
                     OR z_property_id IN $ids GROUP ALL",
                )
                .bind(("ids", property_ids))
                .await
                .map_err(DbError::from)?;
            let locations: Vec<CountRow> = refs.take(0).map_err(DbError::from)?;
            if first_count(locations) > 0 {
                return Err(DbError::Conflict(format!(
                    "properties of device {id_str} are used by dynamic location actions"
                ))
                .into());
            }
        }

        self.db
            .query(
                "DELETE device_property WHERE device_id = $id; \
                 DELETE type::record('device', $id);",
            )
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> SmsResult<PaginatedResult<Device>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM device GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM device \
                 ORDER BY short_name ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<DeviceRow> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(DeviceRow::try_into_device)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
