//! Inventory service: devices, platforms, configurations and device
//! properties behind the archival and permission-group gate.

use sms_core::authz::PermissionGroupOracle;
use sms_core::error::SmsResult;
use sms_core::models::activity::ActivityKind;
use sms_core::models::configuration::{Configuration, CreateConfiguration, UpdateConfiguration};
use sms_core::models::device::{CreateDevice, Device, UpdateDevice};
use sms_core::models::device_property::{
    CreateDeviceProperty, DeviceProperty, UpdateDeviceProperty,
};
use sms_core::models::platform::{CreatePlatform, Platform, UpdatePlatform};
use sms_core::models::principal::Principal;
use sms_core::models::visibility::Visibility;
use sms_core::repository::{
    ConfigurationRepository, DevicePropertyRepository, DeviceRepository, PlatformRepository,
    Store,
};
use tracing::info;
use uuid::Uuid;

use crate::activity::{self, Activity};
use crate::error::ActionError;
use crate::permission::{
    Governed, can_view, ensure_can_administer, ensure_can_assign_groups, ensure_can_edit,
    ensure_not_archived,
};
use crate::validation::require_non_empty;

/// Update inputs that can carry the archive toggle.
trait ArchivePatch {
    fn archive_flag(&self) -> Option<bool>;
    /// `true` if anything besides `archived` would change.
    fn edits_fields(&self) -> bool;
}

impl ArchivePatch for UpdateDevice {
    fn archive_flag(&self) -> Option<bool> {
        self.archived
    }

    fn edits_fields(&self) -> bool {
        let UpdateDevice {
            short_name,
            long_name,
            serial_number,
            manufacturer_name,
            model,
            group_ids,
            visibility,
            archived: _,
        } = self;
        short_name.is_some()
            || long_name.is_some()
            || serial_number.is_some()
            || manufacturer_name.is_some()
            || model.is_some()
            || group_ids.is_some()
            || visibility.is_some()
    }
}

impl ArchivePatch for UpdatePlatform {
    fn archive_flag(&self) -> Option<bool> {
        self.archived
    }

    fn edits_fields(&self) -> bool {
        let UpdatePlatform {
            short_name,
            long_name,
            serial_number,
            manufacturer_name,
            model,
            group_ids,
            visibility,
            archived: _,
        } = self;
        short_name.is_some()
            || long_name.is_some()
            || serial_number.is_some()
            || manufacturer_name.is_some()
            || model.is_some()
            || group_ids.is_some()
            || visibility.is_some()
    }
}

impl ArchivePatch for UpdateConfiguration {
    fn archive_flag(&self) -> Option<bool> {
        self.archived
    }

    fn edits_fields(&self) -> bool {
        let UpdateConfiguration {
            label,
            description,
            status,
            permission_group,
            visibility,
            archived: _,
        } = self;
        label.is_some()
            || description.is_some()
            || status.is_some()
            || permission_group.is_some()
            || visibility.is_some()
    }
}

fn ensure_configuration_visibility(visibility: Visibility) -> Result<(), ActionError> {
    if visibility == Visibility::Private {
        return Err(ActionError::InvalidInput(
            "configurations cannot be private".into(),
        ));
    }
    Ok(())
}

/// CRUD over the inventory entities that actions refer to.
pub struct InventoryService<S: Store, O: PermissionGroupOracle> {
    store: S,
    oracle: O,
}

impl<S: Store, O: PermissionGroupOracle> InventoryService<S, O> {
    pub fn new(store: S, oracle: O) -> Self {
        Self { store, oracle }
    }

    // -----------------------------------------------------------------
    // Devices
    // -----------------------------------------------------------------

    pub async fn create_device(
        &self,
        principal: &Principal,
        input: CreateDevice,
    ) -> SmsResult<Device> {
        require_non_empty("short_name", &input.short_name)?;
        ensure_can_assign_groups(&self.oracle, principal, &input.group_ids).await?;

        let device = self
            .store
            .devices()
            .create(CreateDevice {
                created_by: principal.subject.clone(),
                ..input
            })
            .await?;
        info!(id = %device.id, short_name = %device.short_name, "Device created");
        self.log(principal, ActivityKind::Create, &device, "created device")
            .await;
        Ok(device)
    }

    pub async fn get_device(&self, principal: Option<&Principal>, id: Uuid) -> SmsResult<Device> {
        let device = self.store.devices().get_by_id(id).await?;
        ensure_visible(principal, &device)?;
        Ok(device)
    }

    pub async fn update_device(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateDevice,
    ) -> SmsResult<Device> {
        if let Some(short_name) = &patch.short_name {
            require_non_empty("short_name", short_name)?;
        }
        let current = self.store.devices().get_by_id(id).await?;
        self.authorize_update(principal, &current, &patch).await?;
        if let Some(groups) = &patch.group_ids {
            ensure_can_assign_groups(&self.oracle, principal, groups).await?;
        }

        let description = describe_update("device", &patch);
        let device = self.store.devices().update(id, patch).await?;
        info!(id = %device.id, archived = device.archived, "Device updated");
        self.log(principal, ActivityKind::Update, &device, description)
            .await;
        Ok(device)
    }

    pub async fn archive_device(&self, principal: &Principal, id: Uuid) -> SmsResult<Device> {
        self.update_device(
            principal,
            id,
            UpdateDevice {
                archived: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn restore_device(&self, principal: &Principal, id: Uuid) -> SmsResult<Device> {
        self.update_device(
            principal,
            id,
            UpdateDevice {
                archived: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_device(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let device = self.store.devices().get_by_id(id).await?;
        ensure_not_archived(&device)?;
        ensure_can_administer(&self.oracle, principal, &device).await?;

        self.store.devices().delete(id).await?;
        info!(%id, "Device deleted");
        self.log(principal, ActivityKind::Delete, &device, "deleted device")
            .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Platforms
    // -----------------------------------------------------------------

    pub async fn create_platform(
        &self,
        principal: &Principal,
        input: CreatePlatform,
    ) -> SmsResult<Platform> {
        require_non_empty("short_name", &input.short_name)?;
        ensure_can_assign_groups(&self.oracle, principal, &input.group_ids).await?;

        let platform = self
            .store
            .platforms()
            .create(CreatePlatform {
                created_by: principal.subject.clone(),
                ..input
            })
            .await?;
        info!(id = %platform.id, short_name = %platform.short_name, "Platform created");
        self.log(principal, ActivityKind::Create, &platform, "created platform")
            .await;
        Ok(platform)
    }

    pub async fn get_platform(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> SmsResult<Platform> {
        let platform = self.store.platforms().get_by_id(id).await?;
        ensure_visible(principal, &platform)?;
        Ok(platform)
    }

    pub async fn update_platform(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdatePlatform,
    ) -> SmsResult<Platform> {
        if let Some(short_name) = &patch.short_name {
            require_non_empty("short_name", short_name)?;
        }
        let current = self.store.platforms().get_by_id(id).await?;
        self.authorize_update(principal, &current, &patch).await?;
        if let Some(groups) = &patch.group_ids {
            ensure_can_assign_groups(&self.oracle, principal, groups).await?;
        }

        let description = describe_update("platform", &patch);
        let platform = self.store.platforms().update(id, patch).await?;
        info!(id = %platform.id, archived = platform.archived, "Platform updated");
        self.log(principal, ActivityKind::Update, &platform, description)
            .await;
        Ok(platform)
    }

    pub async fn archive_platform(&self, principal: &Principal, id: Uuid) -> SmsResult<Platform> {
        self.update_platform(
            principal,
            id,
            UpdatePlatform {
                archived: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn restore_platform(&self, principal: &Principal, id: Uuid) -> SmsResult<Platform> {
        self.update_platform(
            principal,
            id,
            UpdatePlatform {
                archived: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_platform(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let platform = self.store.platforms().get_by_id(id).await?;
        ensure_not_archived(&platform)?;
        ensure_can_administer(&self.oracle, principal, &platform).await?;

        self.store.platforms().delete(id).await?;
        info!(%id, "Platform deleted");
        self.log(principal, ActivityKind::Delete, &platform, "deleted platform")
            .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Configurations
    // -----------------------------------------------------------------

    pub async fn create_configuration(
        &self,
        principal: &Principal,
        input: CreateConfiguration,
    ) -> SmsResult<Configuration> {
        require_non_empty("label", &input.label)?;
        ensure_configuration_visibility(input.visibility)?;
        ensure_can_assign_groups(&self.oracle, principal, input.permission_group.as_slice())
            .await?;

        let configuration = self
            .store
            .configurations()
            .create(CreateConfiguration {
                created_by: principal.subject.clone(),
                ..input
            })
            .await?;
        info!(id = %configuration.id, label = %configuration.label, "Configuration created");
        self.log(
            principal,
            ActivityKind::Create,
            &configuration,
            "created configuration",
        )
        .await;
        Ok(configuration)
    }

    pub async fn get_configuration(
        &self,
        principal: Option<&Principal>,
        id: Uuid,
    ) -> SmsResult<Configuration> {
        let configuration = self.store.configurations().get_by_id(id).await?;
        ensure_visible(principal, &configuration)?;
        Ok(configuration)
    }

    pub async fn update_configuration(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateConfiguration,
    ) -> SmsResult<Configuration> {
        if let Some(label) = &patch.label {
            require_non_empty("label", label)?;
        }
        if let Some(visibility) = patch.visibility {
            ensure_configuration_visibility(visibility)?;
        }
        let current = self.store.configurations().get_by_id(id).await?;
        self.authorize_update(principal, &current, &patch).await?;
        if let Some(Some(group)) = &patch.permission_group {
            ensure_can_assign_groups(&self.oracle, principal, std::slice::from_ref(group))
                .await?;
        }

        let description = describe_update("configuration", &patch);
        let configuration = self.store.configurations().update(id, patch).await?;
        info!(
            id = %configuration.id,
            archived = configuration.archived,
            "Configuration updated"
        );
        self.log(principal, ActivityKind::Update, &configuration, description)
            .await;
        Ok(configuration)
    }

    pub async fn archive_configuration(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> SmsResult<Configuration> {
        self.update_configuration(
            principal,
            id,
            UpdateConfiguration {
                archived: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn restore_configuration(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> SmsResult<Configuration> {
        self.update_configuration(
            principal,
            id,
            UpdateConfiguration {
                archived: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_configuration(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let configuration = self.store.configurations().get_by_id(id).await?;
        ensure_not_archived(&configuration)?;
        ensure_can_administer(&self.oracle, principal, &configuration).await?;

        self.store.configurations().delete(id).await?;
        info!(%id, "Configuration deleted");
        self.log(
            principal,
            ActivityKind::Delete,
            &configuration,
            "deleted configuration",
        )
        .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Device properties
    // -----------------------------------------------------------------

    pub async fn create_device_property(
        &self,
        principal: &Principal,
        input: CreateDeviceProperty,
    ) -> SmsResult<DeviceProperty> {
        require_non_empty("property_name", &input.property_name)?;
        self.editable_device(principal, input.device_id).await?;

        let property = self.store.device_properties().create(input).await?;
        info!(id = %property.id, device_id = %property.device_id, "Device property created");
        self.log_property(principal, ActivityKind::Create, &property)
            .await;
        Ok(property)
    }

    pub async fn list_device_properties(
        &self,
        principal: Option<&Principal>,
        device_id: Uuid,
    ) -> SmsResult<Vec<DeviceProperty>> {
        self.get_device(principal, device_id).await?;
        self.store.device_properties().list_by_device(device_id).await
    }

    pub async fn update_device_property(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: UpdateDeviceProperty,
    ) -> SmsResult<DeviceProperty> {
        if let Some(name) = &patch.property_name {
            require_non_empty("property_name", name)?;
        }
        let current = self.store.device_properties().get_by_id(id).await?;
        self.editable_device(principal, current.device_id).await?;

        let property = self.store.device_properties().update(id, patch).await?;
        info!(id = %property.id, "Device property updated");
        self.log_property(principal, ActivityKind::Update, &property)
            .await;
        Ok(property)
    }

    pub async fn delete_device_property(&self, principal: &Principal, id: Uuid) -> SmsResult<()> {
        let property = self.store.device_properties().get_by_id(id).await?;
        self.editable_device(principal, property.device_id).await?;

        self.store.device_properties().delete(id).await?;
        info!(%id, "Device property deleted");
        self.log_property(principal, ActivityKind::Delete, &property)
            .await;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Archived resources only accept the archive toggle. Toggling it
    /// needs admin rights, anything else edit rights.
    async fn authorize_update(
        &self,
        principal: &Principal,
        current: &impl Governed,
        patch: &impl ArchivePatch,
    ) -> SmsResult<()> {
        if current.is_archived() && patch.edits_fields() {
            return Err(ActionError::Archived {
                entity: current.entity(),
                id: current.id(),
            }
            .into());
        }
        let toggles = patch
            .archive_flag()
            .is_some_and(|flag| flag != current.is_archived());
        if toggles {
            ensure_can_administer(&self.oracle, principal, current).await
        } else {
            ensure_can_edit(&self.oracle, principal, current).await
        }
    }

    async fn editable_device(&self, principal: &Principal, id: Uuid) -> SmsResult<Device> {
        let device = self.store.devices().get_by_id(id).await?;
        ensure_not_archived(&device)?;
        ensure_can_edit(&self.oracle, principal, &device).await?;
        Ok(device)
    }

    async fn log(
        &self,
        principal: &Principal,
        action: ActivityKind,
        resource: &impl Governed,
        description: impl AsRef<str>,
    ) {
        activity::record(
            &self.store,
            principal,
            Activity {
                action,
                entity: resource.entity(),
                entity_id: resource.id(),
                configuration_id: None,
                description: description.as_ref(),
            },
        )
        .await;
    }

    async fn log_property(
        &self,
        principal: &Principal,
        action: ActivityKind,
        property: &DeviceProperty,
    ) {
        let description = format!(
            "{} property {} of device {}",
            action.as_str().to_lowercase(),
            property.property_name,
            property.device_id
        );
        activity::record(
            &self.store,
            principal,
            Activity {
                action,
                entity: "device_property",
                entity_id: property.id,
                configuration_id: None,
                description: &description,
            },
        )
        .await;
    }
}

fn ensure_visible(principal: Option<&Principal>, resource: &impl Governed) -> SmsResult<()> {
    if can_view(principal, resource) {
        return Ok(());
    }
    Err(ActionError::NotPermitted(format!(
        "{} {} is not visible to {}",
        resource.entity(),
        resource.id(),
        principal.map_or("anonymous users", |p| p.subject.as_str())
    ))
    .into())
}

fn describe_update(entity: &str, patch: &impl ArchivePatch) -> String {
    match (patch.archive_flag(), patch.edits_fields()) {
        (Some(true), false) => format!("archived {entity}"),
        (Some(false), false) => format!("restored {entity}"),
        _ => format!("updated {entity}"),
    }
}
