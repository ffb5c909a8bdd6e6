//! SurrealDB repository implementations.

mod activity;
mod configuration;
mod device;
mod device_mount;
mod device_property;
mod dynamic_location;
mod platform;
mod platform_mount;
mod static_location;
mod store;

pub use activity::SurrealActivityLogRepository;
pub use configuration::SurrealConfigurationRepository;
pub use device::SurrealDeviceRepository;
pub use device_mount::SurrealDeviceMountActionRepository;
pub use device_property::SurrealDevicePropertyRepository;
pub use dynamic_location::SurrealDynamicLocationActionRepository;
pub use platform::SurrealPlatformRepository;
pub use platform_mount::SurrealPlatformMountActionRepository;
pub use static_location::SurrealStaticLocationActionRepository;
pub use store::SurrealStore;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}

fn first_count(rows: Vec<CountRow>) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}
