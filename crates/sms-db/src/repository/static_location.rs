//! SurrealDB implementation of [`StaticLocationActionRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::location_action::{
    CreateStaticLocationAction, StaticLocationAction, UpdateStaticLocationAction,
};
use sms_core::repository::StaticLocationActionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SELECT_ONE: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('static_location_action', $id)";

#[derive(Debug, SurrealValue)]
struct StaticLocationRow {
    record_id: String,
    configuration_id: String,
    begin_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    epsg_code: Option<String>,
    elevation_datum_name: Option<String>,
    begin_description: Option<String>,
    end_description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StaticLocationRow {
    fn try_into_action(self) -> Result<StaticLocationAction, DbError> {
        Ok(StaticLocationAction {
            id: parse_uuid("static_location_action", &self.record_id)?,
            configuration_id: parse_uuid("configuration", &self.configuration_id)?,
            begin_date: self.begin_date,
            end_date: self.end_date,
            x: self.x,
            y: self.y,
            z: self.z,
            epsg_code: self.epsg_code,
            elevation_datum_name: self.elevation_datum_name,
            begin_description: self.begin_description,
            end_description: self.end_description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<StaticLocationRow>, id: String) -> Result<StaticLocationAction, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "static_location_action".into(),
            id,
        })?
        .try_into_action()
}

/// SurrealDB implementation of the StaticLocationAction repository.
#[derive(Clone)]
pub struct SurrealStaticLocationActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStaticLocationActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StaticLocationActionRepository for SurrealStaticLocationActionRepository<C> {
    async fn create(&self, input: CreateStaticLocationAction) -> SmsResult<StaticLocationAction> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('static_location_action', $id) SET \
             configuration_id = $configuration_id, \
             begin_date = $begin_date, end_date = $end_date, \
             x = $x, y = $y, z = $z, epsg_code = $epsg_code, \
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
            .bind(("x", input.x))
            .bind(("y", input.y))
            .bind(("z", input.z))
            .bind(("epsg_code", input.epsg_code))
            .bind(("elevation_datum_name", input.elevation_datum_name))
            .bind(("begin_description", input.begin_description))
            .bind(("end_description", input.end_description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<StaticLocationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<StaticLocationAction> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StaticLocationRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateStaticLocationAction,
    ) -> SmsResult<StaticLocationAction> {
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
        if input.x.is_some() {
            sets.push("x = $x");
        }
        if input.y.is_some() {
            sets.push("y = $y");
        }
        if input.z.is_some() {
            sets.push("z = $z");
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
            "UPDATE type::record('static_location_action', $id) SET {}; {SELECT_ONE};",
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
        if let Some(x) = input.x {
            builder = builder.bind(("x", x));
        }
        if let Some(y) = input.y {
            builder = builder.bind(("y", y));
        }
        if let Some(z) = input.z {
            builder = builder.bind(("z", z));
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
        let rows: Vec<StaticLocationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('static_location_action', $id)")
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
    ) -> SmsResult<Vec<StaticLocationAction>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM static_location_action \
                 WHERE configuration_id = $configuration_id \
                 ORDER BY begin_date ASC",
            )
            .bind(("configuration_id", configuration_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StaticLocationRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(StaticLocationRow::try_into_action)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }
}
