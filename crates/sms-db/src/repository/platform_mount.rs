//! SurrealDB implementation of [`PlatformMountActionRepository`].

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::models::mount_action::{
    CreatePlatformMountAction, PlatformMountAction, UpdatePlatformMountAction,
};
use sms_core::repository::PlatformMountActionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

const SELECT_ONE: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('platform_mount_action', $id)";

#[derive(Debug, SurrealValue)]
struct PlatformMountRow {
    record_id: String,
    configuration_id: String,
    platform_id: String,
    parent_platform_id: Option<String>,
    begin_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    offset_x: f64,
    offset_y: f64,
    offset_z: f64,
    begin_description: Option<String>,
    end_description: Option<String>,
    begin_contact: String,
    end_contact: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlatformMountRow {
    fn try_into_action(self) -> Result<PlatformMountAction, DbError> {
        Ok(PlatformMountAction {
            id: parse_uuid("platform_mount_action", &self.record_id)?,
            configuration_id: parse_uuid("configuration", &self.configuration_id)?,
            platform_id: parse_uuid("platform", &self.platform_id)?,
            parent_platform_id: parse_opt_uuid("parent platform", self.parent_platform_id)?,
            begin_date: self.begin_date,
            end_date: self.end_date,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            offset_z: self.offset_z,
            begin_description: self.begin_description,
            end_description: self.end_description,
            begin_contact: self.begin_contact,
            end_contact: self.end_contact,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn single(rows: Vec<PlatformMountRow>, id: String) -> Result<PlatformMountAction, DbError> {
    rows.into_iter()
        .next()
        .ok_or(DbError::NotFound {
            entity: "platform_mount_action".into(),
            id,
        })?
        .try_into_action()
}

fn collect(rows: Vec<PlatformMountRow>) -> SmsResult<Vec<PlatformMountAction>> {
    rows.into_iter()
        .map(PlatformMountRow::try_into_action)
        .collect::<Result<Vec<_>, DbError>>()
        .map_err(Into::into)
}

/// SurrealDB implementation of the PlatformMountAction repository.
#[derive(Clone)]
pub struct SurrealPlatformMountActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPlatformMountActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn select_where(
        &self,
        condition: &str,
        bindings: Vec<(&'static str, String)>,
    ) -> SmsResult<Vec<PlatformMountAction>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM platform_mount_action \
             WHERE {condition} ORDER BY begin_date ASC"
        );
        let mut builder = self.db.query(query);
        for binding in bindings {
            builder = builder.bind(binding);
        }
        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<PlatformMountRow> = result.take(0).map_err(DbError::from)?;
        collect(rows)
    }
}

impl<C: Connection> PlatformMountActionRepository for SurrealPlatformMountActionRepository<C> {
    async fn create(&self, input: CreatePlatformMountAction) -> SmsResult<PlatformMountAction> {
        let id_str = Uuid::new_v4().to_string();

        let query = format!(
            "CREATE type::record('platform_mount_action', $id) SET \
             configuration_id = $configuration_id, platform_id = $platform_id, \
             parent_platform_id = $parent_platform_id, \
             begin_date = $begin_date, end_date = $end_date, \
             offset_x = $offset_x, offset_y = $offset_y, offset_z = $offset_z, \
             begin_description = $begin_description, \
             end_description = $end_description, \
             begin_contact = $begin_contact, end_contact = $end_contact; \
             {SELECT_ONE};"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("configuration_id", input.configuration_id.to_string()))
            .bind(("platform_id", input.platform_id.to_string()))
            .bind((
                "parent_platform_id",
                input.parent_platform_id.map(|p| p.to_string()),
            ))
            .bind(("begin_date", input.begin_date))
            .bind(("end_date", input.end_date))
            .bind(("offset_x", input.offset_x))
            .bind(("offset_y", input.offset_y))
            .bind(("offset_z", input.offset_z))
            .bind(("begin_description", input.begin_description))
            .bind(("end_description", input.end_description))
            .bind(("begin_contact", input.begin_contact))
            .bind(("end_contact", input.end_contact))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<PlatformMountRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn get_by_id(&self, id: Uuid) -> SmsResult<PlatformMountAction> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlatformMountRow> = result.take(0).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdatePlatformMountAction,
    ) -> SmsResult<PlatformMountAction> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.configuration_id.is_some() {
            sets.push("configuration_id = $configuration_id");
        }
        if input.platform_id.is_some() {
            sets.push("platform_id = $platform_id");
        }
        if input.parent_platform_id.is_some() {
            sets.push("parent_platform_id = $parent_platform_id");
        }
        if input.begin_date.is_some() {
            sets.push("begin_date = $begin_date");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        if input.offset_x.is_some() {
            sets.push("offset_x = $offset_x");
        }
        if input.offset_y.is_some() {
            sets.push("offset_y = $offset_y");
        }
        if input.offset_z.is_some() {
            sets.push("offset_z = $offset_z");
        }
        if input.begin_description.is_some() {
            sets.push("begin_description = $begin_description");
        }
        if input.end_description.is_some() {
            sets.push("end_description = $end_description");
        }
        if input.begin_contact.is_some() {
            sets.push("begin_contact = $begin_contact");
        }
        if input.end_contact.is_some() {
            sets.push("end_contact = $end_contact");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('platform_mount_action', $id) SET {}; {SELECT_ONE};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(configuration_id) = input.configuration_id {
            builder = builder.bind(("configuration_id", configuration_id.to_string()));
        }
        if let Some(platform_id) = input.platform_id {
            builder = builder.bind(("platform_id", platform_id.to_string()));
        }
        if let Some(parent_platform_id) = input.parent_platform_id {
            // Some(None) clears the parent.
            builder = builder.bind((
                "parent_platform_id",
                parent_platform_id.map(|p| p.to_string()),
            ));
        }
        if let Some(begin_date) = input.begin_date {
            builder = builder.bind(("begin_date", begin_date));
        }
        if let Some(end_date) = input.end_date {
            builder = builder.bind(("end_date", end_date));
        }
        if let Some(offset_x) = input.offset_x {
            builder = builder.bind(("offset_x", offset_x));
        }
        if let Some(offset_y) = input.offset_y {
            builder = builder.bind(("offset_y", offset_y));
        }
        if let Some(offset_z) = input.offset_z {
            builder = builder.bind(("offset_z", offset_z));
        }
        if let Some(begin_description) = input.begin_description {
            builder = builder.bind(("begin_description", begin_description));
        }
        if let Some(end_description) = input.end_description {
            builder = builder.bind(("end_description", end_description));
        }
        if let Some(begin_contact) = input.begin_contact {
            builder = builder.bind(("begin_contact", begin_contact));
        }
        if let Some(end_contact) = input.end_contact {
            builder = builder.bind(("end_contact", end_contact));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<PlatformMountRow> = result.take(1).map_err(DbError::from)?;
        single(rows, id_str).map_err(Into::into)
    }

    async fn delete(&self, id: Uuid) -> SmsResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('platform_mount_action', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_check)?;

        Ok(())
    }

    async fn list_by_platform(&self, platform_id: Uuid) -> SmsResult<Vec<PlatformMountAction>> {
        self.select_where(
            "platform_id = $platform_id",
            vec![("platform_id", platform_id.to_string())],
        )
        .await
    }

    async fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> SmsResult<Vec<PlatformMountAction>> {
        self.select_where(
            "configuration_id = $configuration_id",
            vec![("configuration_id", configuration_id.to_string())],
        )
        .await
    }

    async fn list_by_configuration_and_platform(
        &self,
        configuration_id: Uuid,
        platform_id: Uuid,
    ) -> SmsResult<Vec<PlatformMountAction>> {
        self.select_where(
            "configuration_id = $configuration_id AND platform_id = $platform_id",
            vec![
                ("configuration_id", configuration_id.to_string()),
                ("platform_id", platform_id.to_string()),
            ],
        )
        .await
    }
}
