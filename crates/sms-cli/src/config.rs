//! Server configuration loaded from a TOML file.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use sms_core::authz::StaticPermissionGroups;
use sms_db::DbConfig;

/// Top-level configuration file layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub database: DbConfig,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG`
    /// is not set.
    pub log_filter: String,
    pub permission_groups: Vec<GroupAssignment>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            log_filter: "sms=info".into(),
            permission_groups: Vec::new(),
        }
    }
}

/// Group memberships of one subject.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupAssignment {
    pub subject: String,
    pub member_of: Vec<String>,
    pub admin_of: Vec<String>,
}

impl ServerConfig {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Membership table for the permission checks.
    pub fn to_oracle(&self) -> StaticPermissionGroups {
        self.permission_groups
            .iter()
            .fold(StaticPermissionGroups::new(), |groups, entry| {
                let groups = entry
                    .member_of
                    .iter()
                    .fold(groups, |g, group| g.add_member(&entry.subject, group));
                entry
                    .admin_of
                    .iter()
                    .fold(groups, |g, group| g.add_admin(&entry.subject, group))
            })
    }
}

#[cfg(test)]
mod tests {
    use sms_core::authz::PermissionGroupOracle;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::parse("").unwrap();
        assert_eq!(config.log_filter, "sms=info");
        assert_eq!(config.database.namespace, "sms");
        assert!(config.permission_groups.is_empty());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = ServerConfig::load(Path::new("/nonexistent/sms.toml")).unwrap();
        assert_eq!(config.database.url, "127.0.0.1:8000");
    }

    #[test]
    fn partial_database_section_keeps_other_defaults() {
        let config = ServerConfig::parse(
            r#"
            log_filter = "sms=debug"

            [database]
            url = "db.internal:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "sms=debug");
        assert_eq!(config.database.url, "db.internal:8000");
        assert_eq!(config.database.database, "main");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ServerConfig::parse("log_filter = [").is_err());
    }

    #[tokio::test]
    async fn group_assignments_become_memberships() {
        let config = ServerConfig::parse(
            r#"
            [[permission_groups]]
            subject = "alice"
            member_of = ["hydro"]
            admin_of = ["soil"]
            "#,
        )
        .unwrap();
        let memberships = config.to_oracle().memberships("alice").await.unwrap();
        assert!(memberships.is_member("hydro"));
        assert!(memberships.is_admin("soil"));
        assert!(!memberships.is_admin("hydro"));
    }
}
