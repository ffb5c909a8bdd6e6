//! SurrealDB implementation of [`ConfigurationRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::configuration::{
    Configuration, ConfigurationStatus, CreateConfiguration, UpdateConfiguration,
};
use sms_core::models::visibility::Visibility;
use sms_core::repository::{ConfigurationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_count, parse_uuid};
use crate::error::DbError;

const SELECT_ONE: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('configuration', $id)";

/// Tables whose rows belong to exactly one configuration.
const ACTION_TABLES: [&str; 4] = [
    "device_mount_action",
    "platform_mount_action",
    "static_location_action",
    "dynamic_location_action",
];

#[derive(Debug, SurrealValue)]
struct ConfigurationRow {
    record_id: String,
    label: String,
    description: Option<String>,
    status: String,
    permission_group: Option<String>,
    visibility: String,
    archived: bool,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConfigurationRow {
    fn try_into_configuration(self) -> Result<Configuration, DbError> {
        let status = ConfigurationStatus::parse(&self.status)
            .ok_or_else(|| DbError::Decode(format!("unknown status: {}", self.status)))?;
        let visibility = Visibility::parse(&self.visibility)
            .ok_or_else(|| DbError::Decode(format!("unknown visibility: {}", self.visibility)))?;
        Ok(Configuration {
            id: parse_uuid("configuration", &self.record_id)?,
            label: self.label,
            description: self.description,
            status,
            permission_group: self.permission_group,
            visibility,
            archived: self.archived,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<ConfigurationRow>, id: String) -> Result<Configuration, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "configuration".into(),
            id,
        })?
        .try_into_configuration()
}

/// SurrealDB implementation of the Configuration repository.
#[derive(Clone)]
pub struct SurrealConfigurationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealConfigurationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ConfigurationRepository for SurrealConfigurationRepository<C> {
    async fn create(&self, input: CreateConfiguration) -> SmsResult<Configuration> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('configuration', $id) SET \
             label = $label, description = $description, \
             status = $status, permission_group = $permission_group, \
             visibility = $visibility, created_by = $created_by; \
             {SELECT_ONE};"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("label", input.label))
            .bind(("description", input.description))
            .bind(("status", input.status.as_str()))
            .bind(("permission_group", input.permission_group))
            .bind(("visibility", input.visibility.as_str()))
            .bind(("created_by", input.created_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<ConfigurationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<Configuration> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConfigurationRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(&self, id: Uuid, input: UpdateConfiguration) -> SmsResult<Configuration> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.permission_group.is_some() {
            sets.push("permission_group = $permission_group");
        }
        if input.visibility.is_some() {
            sets.push("visibility = $visibility");
        }
        if input.archived.is_some() {
            sets.push("archived = $archived");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('configuration', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(permission_group) = input.permission_group {
            builder = builder.bind(("permission_group", permission_group));
        }
        if let Some(visibility) = input.visibility {
            builder = builder.bind(("visibility", visibility.as_str()));
        }
        if let Some(archived) = input.archived {
            builder = builder.bind(("archived", archived));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<ConfigurationRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;
        let id_str = id.to_string();

        let query = ACTION_TABLES
            .iter()
            .map(|table| {
                format!(
                    "SELECT count() AS total FROM {table} \
                     WHERE configuration_id = $id GROUP ALL;"
                )
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut check = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        for (index, table) in ACTION_TABLES.iter().enumerate() {
            let rows: Vec<CountRow> = check.take(index).map_err(DbError::from)?;
            if first_count(rows) > 0 {
                return Err(DbError::Conflict(format!(
                    "configuration {id_str} still has rows in {table}"
                ))
                .into());
            }
        }

        self.db
            .query("DELETE type::record('configuration', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> SmsResult<PaginatedResult<Configuration>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM configuration GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM configuration \
                 ORDER BY label ASC \
                 LIMIT $limit START $offset;",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let rows: Vec<ConfigurationRow> = result.take(1).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(ConfigurationRow::try_into_configuration)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: first_count(count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
