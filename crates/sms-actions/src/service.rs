//! Action service: validated create, update and delete of mount and
//! location actions.

use chrono::{DateTime, Utc};
use sms_core::authz::PermissionGroupOracle;
use sms_core::error::SmsResult;
use sms_core::models::activity::{ActivityKind, DailyActivityCount};
use sms_core::models::configuration::Configuration;
use sms_core::models::device::Device;
use sms_core::models::device_property::DeviceProperty;
use sms_core::models::location_action::{
    CreateDynamicLocationAction, CreateStaticLocationAction, DynamicLocationAction,
    PropertyRefs, StaticLocationAction, UpdateDynamicLocationAction,
    UpdateStaticLocationAction,
};
use sms_core::models::mount_action::{
    CreateDeviceMountAction, CreatePlatformMountAction, DeviceMountAction, PlatformMountAction,
    UpdateDeviceMountAction, UpdatePlatformMountAction,
};
use sms_core::models::platform::Platform;
use sms_core::models::principal::Principal;
use sms_core::repository::{
    ConfigurationRepository, DeviceMountActionRepository,
    DeviceRepository, DynamicLocationActionRepository, PlatformMountActionRepository,
    PlatformRepository, StaticLocationActionRepository, Store,
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::activity::{self, Activity};
use crate::error::ActionError;
use crate::permission::{ensure_can_edit, ensure_not_archived};
use crate::validation::{
    action_interval, ensure_device_free, ensure_location_free, ensure_parent_mounted,
    ensure_platform_free, ensure_properties_mounted, require_non_empty, resolve_properties,
};

/// Orchestrates the action pipeline: interval, archival and permission
/// gate, overlap, coverage, persist, activity.
///
/// Generic over the store and the permission-group oracle so that the
/// validation layer has no dependency on the database crate. Share one
/// instance per process: its write lock serializes every
/// validate-and-write sequence.
pub struct ActionService<S: Store, O: PermissionGroupOracle> {
    store: S,
    oracle: O,
    write_lock: Mutex<()>,
}

impl<S: Store, O: PermissionGroupOracle> ActionService<S, O> {
    pub fn new(store: S, oracle: O) -> Self {
        Self {
            store,
            oracle,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------
    // Device mounts
    // -----------------------------------------------------------------

    pub async fn create_device_mount(
        &self,
        principal: &Principal,
        input: CreateDeviceMountAction,
    ) -> SmsResult<DeviceMountAction> {
        require_non_empty("begin_contact", &input.begin_contact)?;
        let interval = action_interval(input.begin_date, input.end_date)?;
        let _guard = self.write_lock.lock().await;

        self.editable_configuration(principal, input.configuration_id)
            .await?;
        self.active_device(input.device_id).await?;
        if let Some(parent_id) = input.parent_platform_id {
            self.active_platform(parent_id).await?;
        }

        ensure_device_free(&self.store, input.device_id, &interval, None).await?;
        if let Some(parent_id) = input.parent_platform_id {
            ensure_parent_mounted(&self.store, input.configuration_id, parent_id, &interval)
                .await?;
        }

        let action = self.store.device_mounts().create(input).await?;
        info!(
            id = %action.id,
            device_id = %action.device_id,
            configuration_id = %action.configuration_id,
            "Device mounted"
        );
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Create,
                entity: "device_mount_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("mounted device {} during {interval}", action.device_id),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn update_device_mount(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateDeviceMountAction,
    ) -> SmsResult<DeviceMountAction> {
        if let Some(contact) = &patch.begin_contact {
            require_non_empty("begin_contact", contact)?;
        }
        let _guard = self.write_lock.lock().await;
        let existing = self.store.device_mounts().get_by_id(id).await?;

        let configuration_id = patch.configuration_id.unwrap_or(existing.configuration_id);
        let device_id = patch.device_id.unwrap_or(existing.device_id);
        let parent_id = patch
            .parent_platform_id
            .unwrap_or(existing.parent_platform_id);
        let interval = action_interval(
            patch.begin_date.unwrap_or(existing.begin_date),
            patch.end_date.unwrap_or(existing.end_date),
        )?;

        self.editable_configurations(principal, configuration_id, existing.configuration_id)
            .await?;
        self.active_devices(device_id, existing.device_id).await?;
        self.active_parents(parent_id, existing.parent_platform_id).await?;

        ensure_device_free(&self.store, device_id, &interval, Some(id)).await?;
        if let Some(parent_id) = parent_id {
            ensure_parent_mounted(&self.store, configuration_id, parent_id, &interval).await?;
        }

        let action = self.store.device_mounts().update(id, patch).await?;
        info!(id = %action.id, "Device mount updated");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Update,
                entity: "device_mount_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("updated mount of device {} to {interval}", action.device_id),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn delete_device_mount(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.device_mounts().get_by_id(id).await?;

        self.editable_configuration(principal, existing.configuration_id)
            .await?;
        self.active_device(existing.device_id).await?;
        if let Some(parent_id) = existing.parent_platform_id {
            self.active_platform(parent_id).await?;
        }

        self.store.device_mounts().delete(id).await?;
        info!(%id, "Device mount deleted");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Delete,
                entity: "device_mount_action",
                entity_id: id,
                configuration_id: Some(existing.configuration_id),
                description: &format!("removed mount of device {}", existing.device_id),
            },
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Platform mounts
    // -----------------------------------------------------------------

    pub async fn create_platform_mount(
        &self,
        principal: &Principal,
        input: CreatePlatformMountAction,
    ) -> SmsResult<PlatformMountAction> {
        require_non_empty("begin_contact", &input.begin_contact)?;
        if input.parent_platform_id == Some(input.platform_id) {
            return Err(ActionError::SelfParent(input.platform_id).into());
        }
        let interval = action_interval(input.begin_date, input.end_date)?;
        let _guard = self.write_lock.lock().await;

        self.editable_configuration(principal, input.configuration_id)
            .await?;
        self.active_platform(input.platform_id).await?;
        if let Some(parent_id) = input.parent_platform_id {
            self.active_platform(parent_id).await?;
        }

        ensure_platform_free(&self.store, input.platform_id, &interval, None).await?;
        if let Some(parent_id) = input.parent_platform_id {
            ensure_parent_mounted(&self.store, input.configuration_id, parent_id, &interval)
                .await?;
        }

        let action = self.store.platform_mounts().create(input).await?;
        info!(
            id = %action.id,
            platform_id = %action.platform_id,
            configuration_id = %action.configuration_id,
            "Platform mounted"
        );
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Create,
                entity: "platform_mount_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("mounted platform {} during {interval}", action.platform_id),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn update_platform_mount(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdatePlatformMountAction,
    ) -> SmsResult<PlatformMountAction> {
        if let Some(contact) = &patch.begin_contact {
            require_non_empty("begin_contact", contact)?;
        }
        let _guard = self.write_lock.lock().await;
        let existing = self.store.platform_mounts().get_by_id(id).await?;

        let configuration_id = patch.configuration_id.unwrap_or(existing.configuration_id);
        let platform_id = patch.platform_id.unwrap_or(existing.platform_id);
        let parent_id = patch
            .parent_platform_id
            .unwrap_or(existing.parent_platform_id);
        if parent_id == Some(platform_id) {
            return Err(ActionError::SelfParent(platform_id).into());
        }
        let interval = action_interval(
            patch.begin_date.unwrap_or(existing.begin_date),
            patch.end_date.unwrap_or(existing.end_date),
        )?;

        self.editable_configurations(principal, configuration_id, existing.configuration_id)
            .await?;
        self.active_platforms(platform_id, existing.platform_id).await?;
        self.active_parents(parent_id, existing.parent_platform_id).await?;

        ensure_platform_free(&self.store, platform_id, &interval, Some(id)).await?;
        if let Some(parent_id) = parent_id {
            ensure_parent_mounted(&self.store, configuration_id, parent_id, &interval).await?;
        }

        let action = self.store.platform_mounts().update(id, patch).await?;
        info!(id = %action.id, "Platform mount updated");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Update,
                entity: "platform_mount_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!(
                    "updated mount of platform {} to {interval}",
                    action.platform_id
                ),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn delete_platform_mount(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.platform_mounts().get_by_id(id).await?;

        self.editable_configuration(principal, existing.configuration_id)
            .await?;
        self.active_platform(existing.platform_id).await?;
        if let Some(parent_id) = existing.parent_platform_id {
            self.active_platform(parent_id).await?;
        }

        self.store.platform_mounts().delete(id).await?;
        info!(%id, "Platform mount deleted");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Delete,
                entity: "platform_mount_action",
                entity_id: id,
                configuration_id: Some(existing.configuration_id),
                description: &format!("removed mount of platform {}", existing.platform_id),
            },
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Static locations
    // -----------------------------------------------------------------

    pub async fn create_static_location(
        &self,
        principal: &Principal,
        input: CreateStaticLocationAction,
    ) -> SmsResult<StaticLocationAction> {
        let interval = action_interval(input.begin_date, input.end_date)?;
        let _guard = self.write_lock.lock().await;

        self.editable_configuration(principal, input.configuration_id)
            .await?;
        ensure_location_free(&self.store, input.configuration_id, &interval, None).await?;

        let action = self.store.static_locations().create(input).await?;
        info!(
            id = %action.id,
            configuration_id = %action.configuration_id,
            "Static location created"
        );
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Create,
                entity: "static_location_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("added static location during {interval}"),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn update_static_location(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateStaticLocationAction,
    ) -> SmsResult<StaticLocationAction> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.static_locations().get_by_id(id).await?;

        let configuration_id = patch.configuration_id.unwrap_or(existing.configuration_id);
        let interval = action_interval(
            patch.begin_date.unwrap_or(existing.begin_date),
            patch.end_date.unwrap_or(existing.end_date),
        )?;

        self.editable_configurations(principal, configuration_id, existing.configuration_id)
            .await?;
        ensure_location_free(&self.store, configuration_id, &interval, Some(id)).await?;

        let action = self.store.static_locations().update(id, patch).await?;
        info!(id = %action.id, "Static location updated");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Update,
                entity: "static_location_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("updated static location to {interval}"),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn delete_static_location(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.static_locations().get_by_id(id).await?;

        self.editable_configuration(principal, existing.configuration_id)
            .await?;

        self.store.static_locations().delete(id).await?;
        info!(%id, "Static location deleted");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Delete,
                entity: "static_location_action",
                entity_id: id,
                configuration_id: Some(existing.configuration_id),
                description: "removed static location",
            },
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Dynamic locations
    // -----------------------------------------------------------------

    pub async fn create_dynamic_location(
        &self,
        principal: &Principal,
        input: CreateDynamicLocationAction,
    ) -> SmsResult<DynamicLocationAction> {
        let interval = action_interval(input.begin_date, input.end_date)?;
        let refs = PropertyRefs {
            x: input.x_property_id,
            y: input.y_property_id,
            z: input.z_property_id,
        };
        let _guard = self.write_lock.lock().await;

        self.editable_configuration(principal, input.configuration_id)
            .await?;
        let properties = resolve_properties(&self.store, refs).await?;
        self.active_property_devices(&properties).await?;

        ensure_location_free(&self.store, input.configuration_id, &interval, None).await?;
        ensure_properties_mounted(&self.store, input.configuration_id, &properties, &interval)
            .await?;

        let action = self.store.dynamic_locations().create(input).await?;
        info!(
            id = %action.id,
            configuration_id = %action.configuration_id,
            properties = properties.len(),
            "Dynamic location created"
        );
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Create,
                entity: "dynamic_location_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("added dynamic location during {interval}"),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn update_dynamic_location(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateDynamicLocationAction,
    ) -> SmsResult<DynamicLocationAction> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.dynamic_locations().get_by_id(id).await?;

        let configuration_id = patch.configuration_id.unwrap_or(existing.configuration_id);
        let interval = action_interval(
            patch.begin_date.unwrap_or(existing.begin_date),
            patch.end_date.unwrap_or(existing.end_date),
        )?;
        let refs = PropertyRefs {
            x: patch.x_property_id.unwrap_or(existing.x_property_id),
            y: patch.y_property_id.unwrap_or(existing.y_property_id),
            z: patch.z_property_id.unwrap_or(existing.z_property_id),
        };

        self.editable_configurations(principal, configuration_id, existing.configuration_id)
            .await?;
        let properties = resolve_properties(&self.store, refs).await?;
        self.active_property_devices(&properties).await?;
        if refs != existing.property_refs() {
            let previous = resolve_properties(&self.store, existing.property_refs()).await?;
            self.active_property_devices(&previous).await?;
        }

        ensure_location_free(&self.store, configuration_id, &interval, Some(id)).await?;
        ensure_properties_mounted(&self.store, configuration_id, &properties, &interval).await?;

        let action = self.store.dynamic_locations().update(id, patch).await?;
        info!(id = %action.id, "Dynamic location updated");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Update,
                entity: "dynamic_location_action",
                entity_id: action.id,
                configuration_id: Some(action.configuration_id),
                description: &format!("updated dynamic location to {interval}"),
            },
        )
        .await;
        Ok(action)
    }

    pub async fn delete_dynamic_location(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> SmsResult<()> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.dynamic_locations().get_by_id(id).await?;

        self.editable_configuration(principal, existing.configuration_id)
            .await?;
        let properties = resolve_properties(&self.store, existing.property_refs()).await?;
        self.active_property_devices(&properties).await?;

        self.store.dynamic_locations().delete(id).await?;
        info!(%id, "Dynamic location deleted");
        activity::record(
            &self.store,
            principal,
            Activity {
                action: ActivityKind::Delete,
                entity: "dynamic_location_action",
                entity_id: id,
                configuration_id: Some(existing.configuration_id),
                description: "removed dynamic location",
            },
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------

    /// Entries per UTC day within `[earliest, latest]`, oldest first.
    pub async fn daily_activity(
        &self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> SmsResult<Vec<DailyActivityCount>> {
        activity::daily_counts(&self.store, earliest, latest).await
    }

    // -----------------------------------------------------------------
    // Gate helpers
    // -----------------------------------------------------------------

    async fn editable_configuration(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> SmsResult<Configuration> {
        let configuration = self.store.configurations().get_by_id(id).await?;
        ensure_not_archived(&configuration)?;
        ensure_can_edit(&self.oracle, principal, &configuration).await?;
        Ok(configuration)
    }

    /// Moving an action checks the configuration it leaves as well.
    async fn editable_configurations(
        &self,
        principal: &Principal,
        target: Uuid,
        previous: Uuid,
    ) -> SmsResult<()> {
        self.editable_configuration(principal, target).await?;
        if target != previous {
            self.editable_configuration(principal, previous).await?;
        }
        Ok(())
    }

    async fn active_device(&self, id: Uuid) -> SmsResult<Device> {
        let device = self.store.devices().get_by_id(id).await?;
        ensure_not_archived(&device)?;
        Ok(device)
    }

    async fn active_platform(&self, id: Uuid) -> SmsResult<Platform> {
        let platform = self.store.platforms().get_by_id(id).await?;
        ensure_not_archived(&platform)?;
        Ok(platform)
    }

    /// An action re-pointed to another device may not leave an
    /// archived one behind.
    async fn active_devices(&self, target: Uuid, previous: Uuid) -> SmsResult<()> {
        self.active_device(target).await?;
        if target != previous {
            self.active_device(previous).await?;
        }
        Ok(())
    }

    async fn active_platforms(&self, target: Uuid, previous: Uuid) -> SmsResult<()> {
        self.active_platform(target).await?;
        if target != previous {
            self.active_platform(previous).await?;
        }
        Ok(())
    }

    async fn active_parents(&self, target: Option<Uuid>, previous: Option<Uuid>) -> SmsResult<()> {
        if let Some(parent_id) = target {
            self.active_platform(parent_id).await?;
        }
        match previous {
            Some(parent_id) if previous != target => {
                self.active_platform(parent_id).await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn active_property_devices(
        &self,
        properties: &[(&'static str, DeviceProperty)],
    ) -> SmsResult<()> {
        let mut checked = Vec::with_capacity(properties.len());
        for (_, property) in properties {
            if !checked.contains(&property.device_id) {
                self.active_device(property.device_id).await?;
                checked.push(property.device_id);
            }
        }
        Ok(())
    }
}
