//! SurrealQL schema for the sensor metadata tables and its versioned
//! migrations.
//!
//! Tables are SCHEMAFULL. Ids and references hold UUID strings, enum
//! columns hold their `as_str` form guarded by ASSERT, and an
//! open-ended action leaves `end_date` NONE.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Devices
-- =======================================================================
DEFINE TABLE device SCHEMAFULL;
DEFINE FIELD short_name ON TABLE device TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD long_name ON TABLE device TYPE option<string>;
DEFINE FIELD serial_number ON TABLE device TYPE option<string>;
DEFINE FIELD manufacturer_name ON TABLE device TYPE option<string>;
DEFINE FIELD model ON TABLE device TYPE option<string>;
DEFINE FIELD group_ids ON TABLE device TYPE array<string> DEFAULT [];
DEFINE FIELD visibility ON TABLE device TYPE string \
    ASSERT $value IN ['Private', 'Internal', 'Public'];
DEFINE FIELD archived ON TABLE device TYPE bool DEFAULT false;
DEFINE FIELD created_by ON TABLE device TYPE string;
DEFINE FIELD created_at ON TABLE device TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE device TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Platforms
-- =======================================================================
DEFINE TABLE platform SCHEMAFULL;
DEFINE FIELD short_name ON TABLE platform TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD long_name ON TABLE platform TYPE option<string>;
DEFINE FIELD serial_number ON TABLE platform TYPE option<string>;
DEFINE FIELD manufacturer_name ON TABLE platform TYPE option<string>;
DEFINE FIELD model ON TABLE platform TYPE option<string>;
DEFINE FIELD group_ids ON TABLE platform TYPE array<string> DEFAULT [];
DEFINE FIELD visibility ON TABLE platform TYPE string \
    ASSERT $value IN ['Private', 'Internal', 'Public'];
DEFINE FIELD archived ON TABLE platform TYPE bool DEFAULT false;
DEFINE FIELD created_by ON TABLE platform TYPE string;
DEFINE FIELD created_at ON TABLE platform TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE platform TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Configurations
-- =======================================================================
DEFINE TABLE configuration SCHEMAFULL;
DEFINE FIELD label ON TABLE configuration TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD description ON TABLE configuration TYPE option<string>;
DEFINE FIELD status ON TABLE configuration TYPE string \
    ASSERT $value IN ['Draft', 'Active', 'Inactive'];
DEFINE FIELD permission_group ON TABLE configuration \
    TYPE option<string>;
DEFINE FIELD visibility ON TABLE configuration TYPE string \
    ASSERT $value IN ['Private', 'Internal', 'Public'];
DEFINE FIELD archived ON TABLE configuration TYPE bool DEFAULT false;
DEFINE FIELD created_by ON TABLE configuration TYPE string;
DEFINE FIELD created_at ON TABLE configuration TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE configuration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_configuration_label ON TABLE configuration \
    COLUMNS label UNIQUE;

-- =======================================================================
-- Device properties (belong to one device)
-- =======================================================================
DEFINE TABLE device_property SCHEMAFULL;
DEFINE FIELD device_id ON TABLE device_property TYPE string;
DEFINE FIELD property_name ON TABLE device_property TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD label ON TABLE device_property TYPE option<string>;
DEFINE FIELD unit_name ON TABLE device_property TYPE option<string>;
DEFINE FIELD resolution ON TABLE device_property TYPE option<float>;
DEFINE FIELD accuracy ON TABLE device_property TYPE option<float>;
DEFINE FIELD created_at ON TABLE device_property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE device_property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_device_property_device ON TABLE device_property \
    COLUMNS device_id;

-- =======================================================================
-- Device mount actions
-- =======================================================================
DEFINE TABLE device_mount_action SCHEMAFULL;
DEFINE FIELD configuration_id ON TABLE device_mount_action TYPE string;
DEFINE FIELD device_id ON TABLE device_mount_action TYPE string;
DEFINE FIELD parent_platform_id ON TABLE device_mount_action \
    TYPE option<string>;
DEFINE FIELD begin_date ON TABLE device_mount_action TYPE datetime;
DEFINE FIELD end_date ON TABLE device_mount_action \
    TYPE option<datetime>;
DEFINE FIELD offset_x ON TABLE device_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD offset_y ON TABLE device_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD offset_z ON TABLE device_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD begin_description ON TABLE device_mount_action \
    TYPE option<string>;
DEFINE FIELD end_description ON TABLE device_mount_action \
    TYPE option<string>;
DEFINE FIELD begin_contact ON TABLE device_mount_action TYPE string;
DEFINE FIELD end_contact ON TABLE device_mount_action \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE device_mount_action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE device_mount_action TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_device_mount_device ON TABLE device_mount_action \
    COLUMNS device_id, begin_date;
DEFINE INDEX idx_device_mount_configuration ON TABLE device_mount_action \
    COLUMNS configuration_id, begin_date;

-- =======================================================================
-- Platform mount actions
-- =======================================================================
DEFINE TABLE platform_mount_action SCHEMAFULL;
DEFINE FIELD configuration_id ON TABLE platform_mount_action TYPE string;
DEFINE FIELD platform_id ON TABLE platform_mount_action TYPE string;
DEFINE FIELD parent_platform_id ON TABLE platform_mount_action \
    TYPE option<string>;
DEFINE FIELD begin_date ON TABLE platform_mount_action TYPE datetime;
DEFINE FIELD end_date ON TABLE platform_mount_action \
    TYPE option<datetime>;
DEFINE FIELD offset_x ON TABLE platform_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD offset_y ON TABLE platform_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD offset_z ON TABLE platform_mount_action TYPE float \
    DEFAULT 0.0;
DEFINE FIELD begin_description ON TABLE platform_mount_action \
    TYPE option<string>;
DEFINE FIELD end_description ON TABLE platform_mount_action \
    TYPE option<string>;
DEFINE FIELD begin_contact ON TABLE platform_mount_action TYPE string;
DEFINE FIELD end_contact ON TABLE platform_mount_action \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE platform_mount_action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE platform_mount_action TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_platform_mount_platform ON TABLE platform_mount_action \
    COLUMNS platform_id, begin_date;
DEFINE INDEX idx_platform_mount_configuration \
    ON TABLE platform_mount_action COLUMNS configuration_id, begin_date;

-- =======================================================================
-- Static location actions
-- =======================================================================
DEFINE TABLE static_location_action SCHEMAFULL;
DEFINE FIELD configuration_id ON TABLE static_location_action \
    TYPE string;
DEFINE FIELD begin_date ON TABLE static_location_action TYPE datetime;
DEFINE FIELD end_date ON TABLE static_location_action \
    TYPE option<datetime>;
DEFINE FIELD x ON TABLE static_location_action TYPE option<float>;
DEFINE FIELD y ON TABLE static_location_action TYPE option<float>;
DEFINE FIELD z ON TABLE static_location_action TYPE option<float>;
DEFINE FIELD epsg_code ON TABLE static_location_action \
    TYPE option<string>;
DEFINE FIELD elevation_datum_name ON TABLE static_location_action \
    TYPE option<string>;
DEFINE FIELD begin_description ON TABLE static_location_action \
    TYPE option<string>;
DEFINE FIELD end_description ON TABLE static_location_action \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE static_location_action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE static_location_action TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_static_location_configuration \
    ON TABLE static_location_action COLUMNS configuration_id, begin_date;

-- =======================================================================
-- Dynamic location actions
-- =======================================================================
DEFINE TABLE dynamic_location_action SCHEMAFULL;
DEFINE FIELD configuration_id ON TABLE dynamic_location_action \
    TYPE string;
DEFINE FIELD begin_date ON TABLE dynamic_location_action TYPE datetime;
DEFINE FIELD end_date ON TABLE dynamic_location_action \
    TYPE option<datetime>;
DEFINE FIELD x_property_id ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD y_property_id ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD z_property_id ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD epsg_code ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD elevation_datum_name ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD begin_description ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD end_description ON TABLE dynamic_location_action \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE dynamic_location_action \
    TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE dynamic_location_action \
    TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_dynamic_location_configuration \
    ON TABLE dynamic_location_action COLUMNS configuration_id, begin_date;

-- =======================================================================
-- Activity log (append-only)
-- =======================================================================
DEFINE TABLE activity_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD actor ON TABLE activity_log TYPE string;
DEFINE FIELD action ON TABLE activity_log TYPE string \
    ASSERT $value IN ['Create', 'Update', 'Delete'];
DEFINE FIELD entity ON TABLE activity_log TYPE string;
DEFINE FIELD entity_id ON TABLE activity_log TYPE string;
DEFINE FIELD configuration_id ON TABLE activity_log TYPE option<string>;
DEFINE FIELD description ON TABLE activity_log TYPE string;
DEFINE FIELD timestamp ON TABLE activity_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_activity_time ON TABLE activity_log COLUMNS timestamp;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the sensor metadata schema up to date.
///
/// Versions already listed in `_migration` are skipped, so running this
/// on every start is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > applied).collect();
    if pending.is_empty() {
        info!(version = applied, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        apply(db, migration).await?;
    }
    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut response = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let latest: Vec<MigrationRecord> = response.take(0)?;
    Ok(latest.first().map_or(0, |record| record.version))
}

/// Run one migration's DDL and record its version in the same request.
async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Migrating sensor schema"
    );
    db.query(migration.sql)
        .query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "schema v{} ({}) not applied: {e}",
                migration.version, migration.name
            ))
        })?;
    info!(version = migration.version, "Sensor schema migrated");
    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_action_table_stores_open_ended_intervals() {
        for table in [
            "device_mount_action",
            "platform_mount_action",
            "static_location_action",
            "dynamic_location_action",
        ] {
            let field = format!("DEFINE FIELD end_date ON TABLE {table}");
            assert!(SCHEMA_V1.contains(&field), "{table} has no end_date");
        }
        assert_eq!(SCHEMA_V1.matches("TYPE option<datetime>").count(), 4);
    }
}
