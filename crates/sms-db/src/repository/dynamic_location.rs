//! SurrealDB implementation of [`DynamicLocationActionRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::location_action::{
    CreateDynamicLocationAction, DynamicLocationAction, UpdateDynamicLocationAction,
};
use sms_core::repository::DynamicLocationActionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

const SELECT_ONE: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('dynamic_location_action', $id)";

#[derive(Debug, SurrealValue)]
struct DynamicLocationRow {
    record_id: String,
    configuration_id: String,
    begin_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    x_property_id: Option<String>,
    y_property_id: Option<String>,
    z_property_id: Option<String>,
    epsg_code: Option<String>,
    elevation_datum_name: Option<String>,
    begin_description: Option<String>,
    end_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DynamicLocationRow {
    fn try_into_action(self) -> Result<DynamicLocationAction, DbError> {
        Ok(DynamicLocationAction {
            id: parse_uuid("dynamic_location_action", &self.record_id)?,
            configuration_id: parse_uuid("configuration", &self.configuration_id)?,
            begin_date: self.begin_date,
            end_date: self.end_date,
            x_property_id: parse_opt_uuid("x_property", self.x_property_id)?,
            y_property_id: parse_opt_uuid("y_property", self.y_property_id)?,
            z_property_id: parse_opt_uuid("z_property", self.z_property_id)?,
            epsg_code: self.epsg_code,
            elevation_datum_name: self.elevation_datum_name,
            begin_description: self.begin_description,
            end_description: self.end_description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<DynamicLocationRow>, id: String) -> Result<DynamicLocationAction, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "dynamic_location_action".into(),
            id,
        })?
        .try_into_action()
}

/// SurrealDB implementation of the DynamicLocationAction repository.
#[derive(Clone)]
pub struct SurrealDynamicLocationActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDynamicLocationActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DynamicLocationActionRepository
    for SurrealDynamicLocationActionRepository<C>
{
    async fn create(
        &self,
        input: CreateDynamicLocationAction,
    ) -> SmsResult<DynamicLocationAction> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('dynamic_location_action', $id) SET \
             configuration_id = $configuration_id, \
             begin_date = $begin_date, end_date = $end_date, \
             x_property_id = $x_property_id, \
             y_property_id = $y_property_id, \
             z_property_id = $z_property_id, \
             epsg_code = $epsg_code, \
             elevation_datum_name = $elevation_datum_name, \
             begin_description = $begin_description, \
             end_description = $end_description; \
             {SELECT_ONE};"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("configuration_id", input.configuration_id.to_string()))
            .bind(("begin_date", input.begin_date))
            .bind(("end_date", input.end_date))
            .bind(("x_property_id", input.x_property_id.map(|p| p.to_string())))
            .bind(("y_property_id", input.y_property_id.map(|p| p.to_string())))
            .bind(("z_property_id", input.z_property_id.map(|p| p.to_string())))
            .bind(("epsg_code", input.epsg_code))
            .bind(("elevation_datum_name", input.elevation_datum_name))
            .bind(("begin_description", input.begin_description))
            .bind(("end_description", input.end_description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DynamicLocationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<DynamicLocationAction> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DynamicLocationRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateDynamicLocationAction,
    ) -> SmsResult<DynamicLocationAction> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.configuration_id.is_some() {
            sets.push("configuration_id = $configuration_id");
        }
        if input.begin_date.is_some() {
            sets.push("begin_date = $begin_date");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        if input.x_property_id.is_some() {
            sets.push("x_property_id = $x_property_id");
        }
        if input.y_property_id.is_some() {
            sets.push("y_property_id = $y_property_id");
        }
        if input.z_property_id.is_some() {
            sets.push("z_property_id = $z_property_id");
        }
        if input.epsg_code.is_some() {
            sets.push("epsg_code = $epsg_code");
        }
        if input.elevation_datum_name.is_some() {
            sets.push("elevation_datum_name = $elevation_datum_name");
        }
        if input.begin_description.is_some() {
            sets.push("begin_description = $begin_description");
        }
        if input.end_description.is_some() {
            sets.push("end_description = $end_description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('dynamic_location_action', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(configuration_id) = input.configuration_id {
            builder = builder.bind(("configuration_id", configuration_id.to_string()));
        }
        if let Some(begin_date) = input.begin_date {
            builder = builder.bind(("begin_date", begin_date));
        }
        if let Some(end_date) = input.end_date {
            builder = builder.bind(("end_date", end_date));
        }
        if let Some(x_property_id) = input.x_property_id {
            builder = builder.bind(("x_property_id", x_property_id.map(|p| p.to_string())));
        }
        if let Some(y_property_id) = input.y_property_id {
            builder = builder.bind(("y_property_id", y_property_id.map(|p| p.to_string())));
        }
        if let Some(z_property_id) = input.z_property_id {
            builder = builder.bind(("z_property_id", z_property_id.map(|p| p.to_string())));
        }
        if let Some(epsg_code) = input.epsg_code {
            builder = builder.bind(("epsg_code", epsg_code));
        }
        if let Some(elevation_datum_name) = input.elevation_datum_name {
            builder = builder.bind(("elevation_datum_name", elevation_datum_name));
        }
        if let Some(begin_description) = input.begin_description {
            builder = builder.bind(("begin_description", begin_description));
        }
        if let Some(end_description) = input.end_description {
            builder = builder.bind(("end_description", end_description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<DynamicLocationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('dynamic_location_action', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> SmsResult<Vec<DynamicLocationAction>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM dynamic_location_action \
                 WHERE configuration_id = $configuration_id \
                 ORDER BY begin_date ASC",
            )
            .bind(("configuration_id", configuration_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DynamicLocationRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(DynamicLocationRow::try_into_action)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
