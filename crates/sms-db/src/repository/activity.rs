//! SurrealDB implementation of [`ActivityLogRepository`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sms_core::error::SmsResult;
use sms_core::models::activity::{
    ActivityKind, ActivityLogEntry, CreateActivityLogEntry, DailyActivityCount,
};
use sms_core::repository::ActivityLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ActivityRow {
    record_id: String,
    actor: String,
    action: String,
    entity: String,
    entity_id: String,
    configuration_id: Option<String>,
    description: String,
    timestamp: DateTime<Utc>,
}

impl ActivityRow {
    fn try_into_entry(self) -> Result<ActivityLogEntry, DbError> {
        let action = ActivityKind::parse(&self.action)
            .ok_or_else(|| DbError::Decode(format!("unknown activity kind: {}", self.action)))?;
        Ok(ActivityLogEntry {
            id: parse_uuid("activity_log", &self.record_id)?,
            actor: self.actor,
            action,
            entity_id: parse_uuid(&self.entity, &self.entity_id)?,
            entity: self.entity,
            configuration_id: parse_opt_uuid("configuration", self.configuration_id)?,
            description: self.description,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TimestampRow {
    timestamp: DateTime<Utc>,
}

/// Folds timestamps into per-day counts, ascending by date.
fn count_by_day(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> Vec<DailyActivityCount> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for ts in timestamps {
        *days.entry(ts.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyActivityCount { date, count })
        .collect()
}

/// SurrealDB implementation of the append-only activity log.
#[derive(Clone)]
pub struct SurrealActivityLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActivityLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ActivityLogRepository for SurrealActivityLogRepository<C> {
    async fn record(&self, input: CreateActivityLogEntry) -> SmsResult<ActivityLogEntry> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('activity_log', $id) SET \
                 actor = $actor, action = $action, entity = $entity, \
                 entity_id = $entity_id, configuration_id = $configuration_id, \
                 description = $description; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('activity_log', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("actor", input.actor))
            .bind(("action", input.action.as_str()))
            .bind(("entity", input.entity))
            .bind(("entity_id", input.entity_id.to_string()))
            .bind((
                "configuration_id",
                input.configuration_id.map(|c| c.to_string()),
            ))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_check)?;
        let rows: Vec<ActivityRow> = result.take(1).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .ok_or(DbError::NotFound {
                entity: "activity_log".into(),
                id: id_str,
            })?
            .try_into_entry()
            .map_err(Into::into)
    }

    async fn list_between(
        &self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> SmsResult<Vec<ActivityLogEntry>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM activity_log \
                 WHERE timestamp >= $earliest AND timestamp <= $latest \
                 ORDER BY timestamp ASC",
            )
            .bind(("earliest", earliest))
            .bind(("latest", latest))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(ActivityRow::try_into_entry)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn daily_counts(
        &self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> SmsResult<Vec<DailyActivityCount>> {
        let mut result = self
            .db
            .query(
                "SELECT timestamp FROM activity_log \
                 WHERE timestamp >= $earliest AND timestamp <= $latest",
            )
            .bind(("earliest", earliest))
            .bind(("latest", latest))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TimestampRow> = result.take(0).map_err(DbError::from)?;
        Ok(count_by_day(rows.into_iter().map(|r| r.timestamp)))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn counts_are_grouped_by_utc_day_in_ascending_order() {
        let counts = count_by_day([at(5, 23), at(2, 1), at(5, 0), at(2, 12), at(2, 13)]);
        assert_eq!(
            counts,
            vec![
                DailyActivityCount {
                    date: NaiveDate::from_ymd_opt(2023, 3, 2).unwrap(),
                    count: 3,
                },
                DailyActivityCount {
                    date: NaiveDate::from_ymd_opt(2023, 3, 5).unwrap(),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn no_timestamps_yields_no_days() {
        assert!(count_by_day(Vec::new()).is_empty());
    }
}
