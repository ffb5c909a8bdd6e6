//! [`Store`] backed by one SurrealDB client.

use sms_core::repository::Store;
use surrealdb::{Connection, Surreal};

use super::{
    SurrealActivityLogRepository, SurrealConfigurationRepository,
    SurrealDeviceMountActionRepository, SurrealDevicePropertyRepository,
    SurrealDeviceRepository, SurrealDynamicLocationActionRepository,
    SurrealPlatformMountActionRepository, SurrealPlatformRepository,
    SurrealStaticLocationActionRepository,
};

/// All SurrealDB repositories sharing one client.
#[derive(Clone)]
pub struct SurrealStore<C: Connection> {
    devices: SurrealDeviceRepository<C>,
    platforms: SurrealPlatformRepository<C>,
    configurations: SurrealConfigurationRepository<C>,
    device_properties: SurrealDevicePropertyRepository<C>,
    device_mounts: SurrealDeviceMountActionRepository<C>,
    platform_mounts: SurrealPlatformMountActionRepository<C>,
    static_locations: SurrealStaticLocationActionRepository<C>,
    dynamic_locations: SurrealDynamicLocationActionRepository<C>,
    activity: SurrealActivityLogRepository<C>,
}

impl<C: Connection> SurrealStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            devices: SurrealDeviceRepository::new(db.clone()),
            platforms: SurrealPlatformRepository::new(db.clone()),
            configurations: SurrealConfigurationRepository::new(db.clone()),
            device_properties: SurrealDevicePropertyRepository::new(db.clone()),
            device_mounts: SurrealDeviceMountActionRepository::new(db.clone()),
            platform_mounts: SurrealPlatformMountActionRepository::new(db.clone()),
            static_locations: SurrealStaticLocationActionRepository::new(db.clone()),
            dynamic_locations: SurrealDynamicLocationActionRepository::new(db.clone()),
            activity: SurrealActivityLogRepository::new(db),
        }
    }
}

impl<C: Connection> Store for SurrealStore<C> {
    type Devices = SurrealDeviceRepository<C>;
    type Platforms = SurrealPlatformRepository<C>;
    type Configurations = SurrealConfigurationRepository<C>;
    type DeviceProperties = SurrealDevicePropertyRepository<C>;
    type DeviceMounts = SurrealDeviceMountActionRepository<C>;
    type PlatformMounts = SurrealPlatformMountActionRepository<C>;
    type StaticLocations = SurrealStaticLocationActionRepository<C>;
    type DynamicLocations = SurrealDynamicLocationActionRepository<C>;
    type Activity = SurrealActivityLogRepository<C>;

    fn devices(&self) -> &Self::Devices {
        &self.devices
    }

    fn platforms(&self) -> &Self::Platforms {
        &self.platforms
    }

    fn configurations(&self) -> &Self::Configurations {
        &self.configurations
    }

    fn device_properties(&self) -> &Self::DeviceProperties {
        &self.device_properties
    }

    fn device_mounts(&self) -> &Self::DeviceMounts {
        &self.device_mounts
    }

    fn platform_mounts(&self) -> &Self::PlatformMounts {
        &self.platform_mounts
    }

    fn static_locations(&self) -> &Self::StaticLocations {
        &self.static_locations
    }

    fn dynamic_locations(&self) -> &Self::DynamicLocations {
        &self.dynamic_locations
    }

    fn activity(&self) -> &Self::Activity {
        &self.activity
    }
}
