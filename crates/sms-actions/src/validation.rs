//! Temporal validation of mount and location actions.
//!
//! Overlap checks compare the candidate interval against every stored
//! action that competes for the same resource. Coverage checks require
//! a referenced resource to be mounted in the same configuration for
//! the whole candidate interval.

use chrono::{DateTime, Utc};
use sms_core::error::SmsResult;
use sms_core::interval::{Interval, Scheduled, first_overlap};
use sms_core::models::device_property::DeviceProperty;
use sms_core::models::location_action::{LocationAction, PropertyRefs};
use sms_core::repository::{
    DeviceMountActionRepository, DevicePropertyRepository, DynamicLocationActionRepository,
    PlatformMountActionRepository, StaticLocationActionRepository, Store,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ActionError;

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ActionError> {
    if value.trim().is_empty() {
        return Err(ActionError::MissingField(field));
    }
    Ok(())
}

/// Interval of an action as entered by a user.
pub fn action_interval(
    begin: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<Interval, ActionError> {
    Ok(Interval::new(begin, end)?)
}

/// A device is mounted at most once at any instant, across all
/// configurations.
pub async fn ensure_device_free<S: Store>(
    store: &S,
    device_id: Uuid,
    candidate: &Interval,
    exclude: Option<Uuid>,
) -> SmsResult<()> {
    let mounts = store.device_mounts().list_by_device(device_id).await?;
    if let Some(existing) = first_overlap(candidate, &mounts, exclude) {
        warn!(
            %device_id,
            existing = %existing.id,
            configuration_id = %existing.configuration_id,
            "Device mount overlaps an existing mount"
        );
        return Err(ActionError::Overlap {
            subject: format!("mount of device {device_id} during {candidate}"),
            existing_kind: "device mount action",
            existing_id: existing.id,
        }
        .into());
    }
    debug!(%device_id, checked = mounts.len(), "Device mount is free");
    Ok(())
}

/// A platform is mounted at most once at any instant, across all
/// configurations.
pub async fn ensure_platform_free<S: Store>(
    store: &S,
    platform_id: Uuid,
    candidate: &Interval,
    exclude: Option<Uuid>,
) -> SmsResult<()> {
    let mounts = store.platform_mounts().list_by_platform(platform_id).await?;
    if let Some(existing) = first_overlap(candidate, &mounts, exclude) {
        warn!(
            %platform_id,
            existing = %existing.id,
            configuration_id = %existing.configuration_id,
            "Platform mount overlaps an existing mount"
        );
        return Err(ActionError::Overlap {
            subject: format!("mount of platform {platform_id} during {candidate}"),
            existing_kind: "platform mount action",
            existing_id: existing.id,
        }
        .into());
    }
    debug!(%platform_id, checked = mounts.len(), "Platform mount is free");
    Ok(())
}

/// Static and dynamic location actions of one configuration share a
/// single timeline.
pub async fn ensure_location_free<S: Store>(
    store: &S,
    configuration_id: Uuid,
    candidate: &Interval,
    exclude: Option<Uuid>,
) -> SmsResult<()> {
    let statics = store
        .static_locations()
        .list_by_configuration(configuration_id)
        .await?;
    let dynamics = store
        .dynamic_locations()
        .list_by_configuration(configuration_id)
        .await?;

    let locations: Vec<LocationAction> = statics
        .into_iter()
        .map(LocationAction::Static)
        .chain(dynamics.into_iter().map(LocationAction::Dynamic))
        .collect();

    if let Some(existing) = first_overlap(candidate, &locations, exclude) {
        warn!(
            %configuration_id,
            existing = %existing.id(),
            kind = existing.kind(),
            "Location action overlaps an existing location"
        );
        return Err(ActionError::Overlap {
            subject: format!("location of configuration {configuration_id} during {candidate}"),
            existing_kind: existing.kind(),
            existing_id: existing.id(),
        }
        .into());
    }
    debug!(%configuration_id, checked = locations.len(), "Location is free");
    Ok(())
}

/// Look up every non-null property reference. Unknown ids are
/// `NotFound`.
pub async fn resolve_properties<S: Store>(
    store: &S,
    refs: PropertyRefs,
) -> SmsResult<Vec<(&'static str, DeviceProperty)>> {
    let mut resolved = Vec::new();
    for (relation, property_id) in refs.iter() {
        let property = store.device_properties().get_by_id(property_id).await?;
        resolved.push((relation, property));
    }
    Ok(resolved)
}

/// Each referenced property's device must be mounted in the
/// configuration for the whole candidate interval.
pub async fn ensure_properties_mounted<S: Store>(
    store: &S,
    configuration_id: Uuid,
    properties: &[(&'static str, DeviceProperty)],
    candidate: &Interval,
) -> SmsResult<()> {
    for (relation, property) in properties {
        let relation = *relation;
        let mounts = store
            .device_mounts()
            .list_by_configuration_and_device(configuration_id, property.device_id)
            .await?;
        let covered = mounts
            .iter()
            .any(|mount| mount.interval().contains(candidate));
        if !covered {
            warn!(
                %configuration_id,
                relation,
                property_id = %property.id,
                device_id = %property.device_id,
                "Referenced property is not mounted for the location interval"
            );
            return Err(ActionError::NotCovered {
                relation,
                target_id: property.id,
                configuration_id,
            }
            .into());
        }
    }
    Ok(())
}

/// A child mount needs its parent platform mounted in the same
/// configuration for the whole candidate interval.
pub async fn ensure_parent_mounted<S: Store>(
    store: &S,
    configuration_id: Uuid,
    parent_platform_id: Uuid,
    candidate: &Interval,
) -> SmsResult<()> {
    let mounts = store
        .platform_mounts()
        .list_by_configuration_and_platform(configuration_id, parent_platform_id)
        .await?;
    if mounts.iter().any(|mount| mount.interval().contains(candidate)) {
        return Ok(());
    }
    warn!(
        %configuration_id,
        %parent_platform_id,
        "Parent platform is not mounted for the child interval"
    );
    Err(ActionError::NotCovered {
        relation: "parent_platform",
        target_id: parent_platform_id,
        configuration_id,
    }
    .into())
}
