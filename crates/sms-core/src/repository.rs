//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Mount and location action
//! repositories expose the listing queries the interval validators
//! need; overlap decisions themselves are made in `sms-actions`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SmsResult;
use crate::models::{
    activity::{ActivityLogEntry, CreateActivityLogEntry, DailyActivityCount},
    configuration::{Configuration, CreateConfiguration, UpdateConfiguration},
    device::{CreateDevice, Device, UpdateDevice},
    device_property::{CreateDeviceProperty, DeviceProperty, UpdateDeviceProperty},
    location_action::{
        CreateDynamicLocationAction, CreateStaticLocationAction, DynamicLocationAction,
        StaticLocationAction, UpdateDynamicLocationAction, UpdateStaticLocationAction,
    },
    mount_action::{
        CreateDeviceMountAction, CreatePlatformMountAction, DeviceMountAction,
        PlatformMountAction, UpdateDeviceMountAction, UpdatePlatformMountAction,
    },
    platform::{CreatePlatform, Platform, UpdatePlatform},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

pub trait DeviceRepository: Send + Sync {
    fn create(&self, input: CreateDevice) -> impl Future<Output = SmsResult<Device>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SmsResult<Device>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateDevice,
    ) -> impl Future<Output = SmsResult<Device>> + Send;
    /// Fails with a conflict while mount actions still reference the
    /// device.
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SmsResult<PaginatedResult<Device>>> + Send;
}

pub trait PlatformRepository: Send + Sync {
    fn create(&self, input: CreatePlatform) -> impl Future<Output = SmsResult<Platform>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SmsResult<Platform>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePlatform,
    ) -> impl Future<Output = SmsResult<Platform>> + Send;
    /// Fails with a conflict while mount actions still reference the
    /// platform, either as mounted platform or as parent.
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SmsResult<PaginatedResult<Platform>>> + Send;
}

pub trait ConfigurationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateConfiguration,
    ) -> impl Future<Output = SmsResult<Configuration>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SmsResult<Configuration>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateConfiguration,
    ) -> impl Future<Output = SmsResult<Configuration>> + Send;
    /// Fails with a conflict while the configuration still has actions.
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = SmsResult<PaginatedResult<Configuration>>> + Send;
}

pub trait DevicePropertyRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDeviceProperty,
    ) -> impl Future<Output = SmsResult<DeviceProperty>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SmsResult<DeviceProperty>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateDeviceProperty,
    ) -> impl Future<Output = SmsResult<DeviceProperty>> + Send;
    /// Fails with a conflict while a dynamic location action refers to
    /// the property.
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list_by_device(
        &self,
        device_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<DeviceProperty>>> + Send;
}

// ---------------------------------------------------------------------------
// Mount actions
// ---------------------------------------------------------------------------

pub trait DeviceMountActionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDeviceMountAction,
    ) -> impl Future<Output = SmsResult<DeviceMountAction>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SmsResult<DeviceMountAction>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateDeviceMountAction,
    ) -> impl Future<Output = SmsResult<DeviceMountAction>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    /// All mounts of a device, in any configuration, ordered by begin.
    fn list_by_device(
        &self,
        device_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<DeviceMountAction>>> + Send;
    fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<DeviceMountAction>>> + Send;
    /// Mounts of one device within one configuration, ordered by begin.
    fn list_by_configuration_and_device(
        &self,
        configuration_id: Uuid,
        device_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<DeviceMountAction>>> + Send;
}

pub trait PlatformMountActionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePlatformMountAction,
    ) -> impl Future<Output = SmsResult<PlatformMountAction>> + Send;
    fn get_by_id(&self, id: Uuid)
    -> impl Future<Output = SmsResult<PlatformMountAction>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePlatformMountAction,
    ) -> impl Future<Output = SmsResult<PlatformMountAction>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    /// All mounts of a platform, in any configuration, ordered by begin.
    fn list_by_platform(
        &self,
        platform_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<PlatformMountAction>>> + Send;
    fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<PlatformMountAction>>> + Send;
    fn list_by_configuration_and_platform(
        &self,
        configuration_id: Uuid,
        platform_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<PlatformMountAction>>> + Send;
}

// ---------------------------------------------------------------------------
// Location actions
// ---------------------------------------------------------------------------

pub trait StaticLocationActionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateStaticLocationAction,
    ) -> impl Future<Output = SmsResult<StaticLocationAction>> + Send;
    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = SmsResult<StaticLocationAction>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateStaticLocationAction,
    ) -> impl Future<Output = SmsResult<StaticLocationAction>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<StaticLocationAction>>> + Send;
}

pub trait DynamicLocationActionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDynamicLocationAction,
    ) -> impl Future<Output = SmsResult<DynamicLocationAction>> + Send;
    fn get_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = SmsResult<DynamicLocationAction>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateDynamicLocationAction,
    ) -> impl Future<Output = SmsResult<DynamicLocationAction>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = SmsResult<()>> + Send;
    fn list_by_configuration(
        &self,
        configuration_id: Uuid,
    ) -> impl Future<Output = SmsResult<Vec<DynamicLocationAction>>> + Send;
}

// ---------------------------------------------------------------------------
// Activity log (append-only)
// ---------------------------------------------------------------------------

pub trait ActivityLogRepository: Send + Sync {
    fn record(
        &self,
        input: CreateActivityLogEntry,
    ) -> impl Future<Output = SmsResult<ActivityLogEntry>> + Send;
    /// Entries with `earliest <= timestamp <= latest`, oldest first.
    fn list_between(
        &self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> impl Future<Output = SmsResult<Vec<ActivityLogEntry>>> + Send;
    /// Per-day entry counts within `[earliest, latest]`, ascending by
    /// date. Days without entries are omitted.
    fn daily_counts(
        &self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> impl Future<Output = SmsResult<Vec<DailyActivityCount>>> + Send;
}

// ---------------------------------------------------------------------------
// Aggregate access
// ---------------------------------------------------------------------------

/// Access to every repository of one backing store.
///
/// Services are generic over a `Store` so that they have no
/// dependency on the database crate.
pub trait Store: Send + Sync {
    type Devices: DeviceRepository;
    type Platforms: PlatformRepository;
    type Configurations: ConfigurationRepository;
    type DeviceProperties: DevicePropertyRepository;
    type DeviceMounts: DeviceMountActionRepository;
    type PlatformMounts: PlatformMountActionRepository;
    type StaticLocations: StaticLocationActionRepository;
    type DynamicLocations: DynamicLocationActionRepository;
    type Activity: ActivityLogRepository;

    fn devices(&self) -> &Self::Devices;
    fn platforms(&self) -> &Self::Platforms;
    fn configurations(&self) -> &Self::Configurations;
    fn device_properties(&self) -> &Self::DeviceProperties;
    fn device_mounts(&self) -> &Self::DeviceMounts;
    fn platform_mounts(&self) -> &Self::PlatformMounts;
    fn static_locations(&self) -> &Self::StaticLocations;
    fn dynamic_locations(&self) -> &Self::DynamicLocations;
    fn activity(&self) -> &Self::Activity;
}
