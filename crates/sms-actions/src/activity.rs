//! Activity log recording and daily aggregation.

use chrono::{DateTime, Utc};
use sms_core::error::{SmsError, SmsResult};
use sms_core::models::activity::{ActivityKind, CreateActivityLogEntry, DailyActivityCount};
use sms_core::models::principal::Principal;
use sms_core::repository::{ActivityLogRepository, Store};
use tracing::warn;
use uuid::Uuid;

/// One mutation to be written to the activity log.
pub(crate) struct Activity<'a> {
    pub action: ActivityKind,
    pub entity: &'static str,
    pub entity_id: Uuid,
    pub configuration_id: Option<Uuid>,
    pub description: &'a str,
}

/// Append an entry for `principal`. A failed write is logged and
/// swallowed; it never fails the mutation that was already persisted.
pub(crate) async fn record<S: Store>(store: &S, principal: &Principal, activity: Activity<'_>) {
    let entry = CreateActivityLogEntry {
        actor: principal.subject.clone(),
        action: activity.action,
        entity: activity.entity.to_string(),
        entity_id: activity.entity_id,
        configuration_id: activity.configuration_id,
        description: activity.description.to_string(),
    };
    if let Err(e) = store.activity().record(entry).await {
        warn!(
            error = %e,
            entity = activity.entity,
            entity_id = %activity.entity_id,
            "Failed to record activity"
        );
    }
}

/// Entries per UTC day within `[earliest, latest]`, oldest day first.
/// Days without entries are omitted.
pub async fn daily_counts<S: Store>(
    store: &S,
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
) -> SmsResult<Vec<DailyActivityCount>> {
    if earliest > latest {
        return Err(SmsError::validation(format!(
            "earliest {earliest} is after latest {latest}"
        )));
    }
    store.activity().daily_counts(earliest, latest).await
}
