//! Archival and permission-group checks shared by the services.
//!
//! Edit rights follow the resource's permission groups: superusers may
//! edit everything, members (or admins) of one of the groups may edit,
//! and a resource without any group is editable by every authenticated
//! principal. Archiving and deleting need admin rights instead.

use sms_core::authz::PermissionGroupOracle;
use sms_core::error::SmsResult;
use sms_core::models::configuration::Configuration;
use sms_core::models::device::Device;
use sms_core::models::platform::Platform;
use sms_core::models::principal::Principal;
use sms_core::models::visibility::Visibility;
use uuid::Uuid;

use crate::error::ActionError;

/// A resource owned by permission groups.
pub trait Governed {
    fn entity(&self) -> &'static str;
    fn id(&self) -> Uuid;
    fn groups(&self) -> &[String];
    fn created_by(&self) -> &str;
    fn visibility(&self) -> Visibility;
    fn is_archived(&self) -> bool;
}

impl Governed for Device {
    fn entity(&self) -> &'static str {
        "device"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn groups(&self) -> &[String] {
        &self.group_ids
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_archived(&self) -> bool {
        self.archived
    }
}

impl Governed for Platform {
    fn entity(&self) -> &'static str {
        "platform"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn groups(&self) -> &[String] {
        &self.group_ids
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_archived(&self) -> bool {
        self.archived
    }
}

impl Governed for Configuration {
    fn entity(&self) -> &'static str {
        "configuration"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn groups(&self) -> &[String] {
        self.permission_group.as_slice()
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_archived(&self) -> bool {
        self.archived
    }
}

pub fn ensure_not_archived(resource: &impl Governed) -> Result<(), ActionError> {
    if resource.is_archived() {
        return Err(ActionError::Archived {
            entity: resource.entity(),
            id: resource.id(),
        });
    }
    Ok(())
}

pub async fn can_edit<O: PermissionGroupOracle>(
    oracle: &O,
    principal: &Principal,
    resource: &impl Governed,
) -> SmsResult<bool> {
    if principal.is_superuser || resource.groups().is_empty() {
        return Ok(true);
    }
    let memberships = oracle.memberships(&principal.subject).await?;
    Ok(resource.groups().iter().any(|g| memberships.is_member(g)))
}

/// Archive, restore and delete rights.
pub async fn can_administer<O: PermissionGroupOracle>(
    oracle: &O,
    principal: &Principal,
    resource: &impl Governed,
) -> SmsResult<bool> {
    if principal.is_superuser {
        return Ok(true);
    }
    if resource.groups().is_empty() {
        return Ok(resource.created_by() == principal.subject);
    }
    let memberships = oracle.memberships(&principal.subject).await?;
    Ok(resource.groups().iter().any(|g| memberships.is_admin(g)))
}

/// `None` stands for an anonymous caller.
pub fn can_view(principal: Option<&Principal>, resource: &impl Governed) -> bool {
    match resource.visibility() {
        Visibility::Public => true,
        Visibility::Internal => principal.is_some(),
        Visibility::Private => principal
            .is_some_and(|p| p.is_superuser || p.subject == resource.created_by()),
    }
}

pub async fn ensure_can_edit<O: PermissionGroupOracle>(
    oracle: &O,
    principal: &Principal,
    resource: &impl Governed,
) -> SmsResult<()> {
    if can_edit(oracle, principal, resource).await? {
        return Ok(());
    }
    Err(ActionError::NotPermitted(format!(
        "{} may not edit {} {}",
        principal.subject,
        resource.entity(),
        resource.id()
    ))
    .into())
}

pub async fn ensure_can_administer<O: PermissionGroupOracle>(
    oracle: &O,
    principal: &Principal,
    resource: &impl Governed,
) -> SmsResult<()> {
    if can_administer(oracle, principal, resource).await? {
        return Ok(());
    }
    Err(ActionError::NotPermitted(format!(
        "{} may not archive or delete {} {}",
        principal.subject,
        resource.entity(),
        resource.id()
    ))
    .into())
}

/// Non-superusers may only hand a resource to groups they belong to.
pub async fn ensure_can_assign_groups<O: PermissionGroupOracle>(
    oracle: &O,
    principal: &Principal,
    groups: &[String],
) -> SmsResult<()> {
    if principal.is_superuser || groups.is_empty() {
        return Ok(());
    }
    let memberships = oracle.memberships(&principal.subject).await?;
    match groups.iter().find(|g| !memberships.is_member(g)) {
        Some(group) => Err(ActionError::NotPermitted(format!(
            "{} is not a member of group {group}",
            principal.subject
        ))
        .into()),
        None => Ok(()),
    }
}
