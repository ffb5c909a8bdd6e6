//! Integration tests for device, platform, configuration and property
//! repositories using in-memory SurrealDB.

use chrono::{TimeZone, Utc};
use sms_core::error::SmsError;
use sms_core::models::configuration::{
    ConfigurationStatus, CreateConfiguration, UpdateConfiguration,
};
use sms_core::models::device::{CreateDevice, UpdateDevice};
use sms_core::models::device_property::CreateDeviceProperty;
use sms_core::models::location_action::CreateDynamicLocationAction;
use sms_core::models::mount_action::{CreateDeviceMountAction, CreatePlatformMountAction};
use sms_core::models::platform::CreatePlatform;
use sms_core::models::visibility::Visibility;
use sms_core::repository::{
    ConfigurationRepository, DeviceMountActionRepository, DevicePropertyRepository,
    DeviceRepository, DynamicLocationActionRepository, Pagination,
    PlatformMountActionRepository, PlatformRepository, Store,
};
use sms_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealStore<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sms_db::run_migrations(&db).await.unwrap();
    SurrealStore::new(db)
}

fn device(short_name: &str) -> CreateDevice {
    CreateDevice {
        short_name: short_name.into(),
        long_name: None,
        serial_number: Some("SN-001".into()),
        manufacturer_name: None,
        model: None,
        group_ids: vec!["hydrology".into()],
        visibility: Visibility::Internal,
        created_by: "alice".into(),
    }
}

fn platform(short_name: &str) -> CreatePlatform {
    CreatePlatform {
        short_name: short_name.into(),
        long_name: None,
        serial_number: None,
        manufacturer_name: None,
        model: None,
        group_ids: Vec::new(),
        visibility: Visibility::Public,
        created_by: "alice".into(),
    }
}

fn configuration(label: &str) -> CreateConfiguration {
    CreateConfiguration {
        label: label.into(),
        description: None,
        status: ConfigurationStatus::Draft,
        permission_group: Some("hydrology".into()),
        visibility: Visibility::Internal,
        created_by: "alice".into(),
    }
}

fn mount(configuration_id: Uuid, device_id: Uuid) -> CreateDeviceMountAction {
    CreateDeviceMountAction {
        configuration_id,
        device_id,
        parent_platform_id: None,
        begin_date: Utc.with_ymd_and_hms(2022, 4, 5, 0, 0, 0).unwrap(),
        end_date: None,
        offset_x: 0.0,
        offset_y: 0.0,
        offset_z: 0.0,
        begin_description: None,
        end_description: None,
        begin_contact: "alice".into(),
        end_contact: None,
    }
}

#[tokio::test]
async fn create_get_and_update_device() {
    let store = setup().await;

    let created = store.devices().create(device("CTD-1")).await.unwrap();
    assert_eq!(created.short_name, "CTD-1");
    assert_eq!(created.serial_number.as_deref(), Some("SN-001"));
    assert!(!created.archived);

    let fetched = store.devices().get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.group_ids, vec!["hydrology".to_string()]);

    let updated = store
        .devices()
        .update(
            created.id,
            UpdateDevice {
                serial_number: Some(None),
                long_name: Some(Some("Conductivity probe".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.serial_number, None);
    assert_eq!(updated.long_name.as_deref(), Some("Conductivity probe"));
    assert_eq!(updated.short_name, "CTD-1");
}

#[tokio::test]
async fn get_unknown_device_is_not_found() {
    let store = setup().await;
    let err = store.devices().get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn list_devices_is_paginated() {
    let store = setup().await;
    for name in ["A", "B", "C"] {
        store.devices().create(device(name)).await.unwrap();
    }

    let page = store
        .devices()
        .list(Pagination {
            offset: 1,
            limit: 1,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].short_name, "B");
}

#[tokio::test]
async fn configuration_label_is_unique() {
    let store = setup().await;
    store
        .configurations()
        .create(configuration("Boknis Eck"))
        .await
        .unwrap();

    let err = store
        .configurations()
        .create(configuration("Boknis Eck"))
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }), "got {err:?}");
}

#[tokio::test]
async fn configuration_group_can_be_cleared() {
    let store = setup().await;
    let config = store
        .configurations()
        .create(configuration("Tereno"))
        .await
        .unwrap();

    let updated = store
        .configurations()
        .update(
            config.id,
            UpdateConfiguration {
                permission_group: Some(None),
                status: Some(ConfigurationStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.permission_group, None);
    assert_eq!(updated.status, ConfigurationStatus::Active);
}

#[tokio::test]
async fn configurations_are_listed_by_label() {
    let store = setup().await;
    for label in ["Zugspitze", "Achental", "Mittenwald"] {
        store
            .configurations()
            .create(configuration(label))
            .await
            .unwrap();
    }

    let page = store
        .configurations()
        .list(Pagination::default())
        .await
        .unwrap();
    let labels: Vec<_> = page.items.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Achental", "Mittenwald", "Zugspitze"]);
}

#[tokio::test]
async fn property_requires_existing_device() {
    let store = setup().await;
    let err = store
        .device_properties()
        .create(CreateDeviceProperty {
            device_id: Uuid::new_v4(),
            property_name: "Water temperature".into(),
            label: None,
            unit_name: Some("degC".into()),
            resolution: None,
            accuracy: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn properties_are_listed_per_device() {
    let store = setup().await;
    let dev = store.devices().create(device("GPS")).await.unwrap();
    let other = store.devices().create(device("Other")).await.unwrap();

    for name in ["Longitude", "Latitude"] {
        store
            .device_properties()
            .create(CreateDeviceProperty {
                device_id: dev.id,
                property_name: name.into(),
                label: None,
                unit_name: None,
                resolution: None,
                accuracy: None,
            })
            .await
            .unwrap();
    }

    let props = store.device_properties().list_by_device(dev.id).await.unwrap();
    let names: Vec<_> = props.iter().map(|p| p.property_name.as_str()).collect();
    assert_eq!(names, vec!["Latitude", "Longitude"]);
    assert!(
        store
            .device_properties()
            .list_by_device(other.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn mounted_device_cannot_be_deleted() {
    let store = setup().await;
    let dev = store.devices().create(device("CTD")).await.unwrap();
    let config = store
        .configurations()
        .create(configuration("Buoy"))
        .await
        .unwrap();
    let action = store
        .device_mounts()
        .create(mount(config.id, dev.id))
        .await
        .unwrap();

    let err = store.devices().delete(dev.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    let err = store.configurations().delete(config.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    store.device_mounts().delete(action.id).await.unwrap();
    store.devices().delete(dev.id).await.unwrap();
    store.configurations().delete(config.id).await.unwrap();
}

#[tokio::test]
async fn device_with_used_property_cannot_be_deleted() {
    let store = setup().await;
    let dev = store.devices().create(device("GPS")).await.unwrap();
    let config = store
        .configurations()
        .create(configuration("Rover"))
        .await
        .unwrap();
    let prop = store
        .device_properties()
        .create(CreateDeviceProperty {
            device_id: dev.id,
            property_name: "Longitude".into(),
            label: None,
            unit_name: None,
            resolution: None,
            accuracy: None,
        })
        .await
        .unwrap();

    store
        .dynamic_locations()
        .create(CreateDynamicLocationAction {
            configuration_id: config.id,
            begin_date: Utc.with_ymd_and_hms(2022, 9, 5, 0, 0, 0).unwrap(),
            end_date: None,
            x_property_id: Some(prop.id),
            y_property_id: None,
            z_property_id: None,
            epsg_code: Some("4326".into()),
            elevation_datum_name: None,
            begin_description: None,
            end_description: None,
        })
        .await
        .unwrap();

    let err = store.devices().delete(dev.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));
    let err = store.device_properties().delete(prop.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));
}

#[tokio::test]
async fn deleting_device_removes_its_properties() {
    let store = setup().await;
    let dev = store.devices().create(device("Logger")).await.unwrap();
    let prop = store
        .device_properties()
        .create(CreateDeviceProperty {
            device_id: dev.id,
            property_name: "Battery voltage".into(),
            label: None,
            unit_name: Some("V".into()),
            resolution: None,
            accuracy: None,
        })
        .await
        .unwrap();

    store.devices().delete(dev.id).await.unwrap();

    let err = store
        .device_properties()
        .get_by_id(prop.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn parent_platform_cannot_be_deleted() {
    let store = setup().await;
    let parent = store.platforms().create(platform("Mast")).await.unwrap();
    let child = store.platforms().create(platform("Boom")).await.unwrap();
    let config = store
        .configurations()
        .create(configuration("Station"))
        .await
        .unwrap();

    store
        .platform_mounts()
        .create(CreatePlatformMountAction {
            configuration_id: config.id,
            platform_id: child.id,
            parent_platform_id: Some(parent.id),
            begin_date: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 2.5,
            begin_description: None,
            end_description: None,
            begin_contact: "alice".into(),
            end_contact: None,
        })
        .await
        .unwrap();

    let err = store.platforms().delete(parent.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));
    let err = store.platforms().delete(child.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));
}

#[tokio::test]
async fn delete_unknown_platform_is_not_found() {
    let store = setup().await;
    let err = store.platforms().delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}
