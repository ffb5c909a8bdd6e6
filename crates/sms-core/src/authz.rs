//! Permission-group membership lookups.
//!
//! Group membership is owned by an external identity service. The
//! core only consumes it through [`PermissionGroupOracle`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::SmsResult;

/// Permission groups a subject belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Memberships {
    pub member_of: HashSet<String>,
    pub admin_of: HashSet<String>,
}

impl Memberships {
    /// Admins are implicitly members.
    pub fn is_member(&self, group: &str) -> bool {
        self.member_of.contains(group) || self.admin_of.contains(group)
    }

    pub fn is_admin(&self, group: &str) -> bool {
        self.admin_of.contains(group)
    }
}

pub trait PermissionGroupOracle: Send + Sync {
    fn memberships(&self, subject: &str) -> impl Future<Output = SmsResult<Memberships>> + Send;
}

/// Fixed membership table, loaded from configuration or built in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionGroups {
    entries: HashMap<String, Memberships>,
}

impl StaticPermissionGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(mut self, subject: &str, group: &str) -> Self {
        self.entries
            .entry(subject.to_string())
            .or_default()
            .member_of
            .insert(group.to_string());
        self
    }

    pub fn add_admin(mut self, subject: &str, group: &str) -> Self {
        self.entries
            .entry(subject.to_string())
            .or_default()
            .admin_of
            .insert(group.to_string());
        self
    }
}

impl PermissionGroupOracle for StaticPermissionGroups {
    async fn memberships(&self, subject: &str) -> SmsResult<Memberships> {
        Ok(self.entries.get(subject).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_subject_has_no_memberships() {
        let groups = StaticPermissionGroups::new().add_member("alice", "hydro");
        let m = groups.memberships("bob").await.unwrap();
        assert!(m.member_of.is_empty());
        assert!(m.admin_of.is_empty());
    }

    #[tokio::test]
    async fn admins_count_as_members() {
        let groups = StaticPermissionGroups::new()
            .add_member("alice", "hydro")
            .add_admin("alice", "soil");
        let m = groups.memberships("alice").await.unwrap();
        assert!(m.is_member("hydro"));
        assert!(m.is_member("soil"));
        assert!(m.is_admin("soil"));
        assert!(!m.is_admin("hydro"));
    }
}
