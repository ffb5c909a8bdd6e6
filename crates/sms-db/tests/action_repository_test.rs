//! Integration tests for mount, location and activity repositories
//! using in-memory SurrealDB.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sms_core::error::SmsError;
use sms_core::models::activity::{ActivityKind, CreateActivityLogEntry};
use sms_core::models::configuration::{ConfigurationStatus, CreateConfiguration};
use sms_core::models::device::CreateDevice;
use sms_core::models::location_action::{
    CreateDynamicLocationAction, CreateStaticLocationAction, UpdateDynamicLocationAction,
    UpdateStaticLocationAction,
};
use sms_core::models::mount_action::{CreateDeviceMountAction, UpdateDeviceMountAction};
use sms_core::models::visibility::Visibility;
use sms_core::repository::{
    ActivityLogRepository, ConfigurationRepository, DeviceMountActionRepository,
    DeviceRepository, DynamicLocationActionRepository, StaticLocationActionRepository, Store,
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

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

async fn configuration(store: &SurrealStore<Db>, label: &str) -> Uuid {
    store
        .configurations()
        .create(CreateConfiguration {
            label: label.into(),
            description: None,
            status: ConfigurationStatus::Active,
            permission_group: None,
            visibility: Visibility::Public,
            created_by: "alice".into(),
        })
        .await
        .unwrap()
        .id
}

async fn device(store: &SurrealStore<Db>, short_name: &str) -> Uuid {
    store
        .devices()
        .create(CreateDevice {
            short_name: short_name.into(),
            long_name: None,
            serial_number: None,
            manufacturer_name: None,
            model: None,
            group_ids: Vec::new(),
            visibility: Visibility::Public,
            created_by: "alice".into(),
        })
        .await
        .unwrap()
        .id
}

fn mount(
    configuration_id: Uuid,
    device_id: Uuid,
    begin: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> CreateDeviceMountAction {
    CreateDeviceMountAction {
        configuration_id,
        device_id,
        parent_platform_id: None,
        begin_date: begin,
        end_date: end,
        offset_x: 1.0,
        offset_y: 0.0,
        offset_z: -0.5,
        begin_description: Some("installed".into()),
        end_description: None,
        begin_contact: "alice".into(),
        end_contact: None,
    }
}

#[tokio::test]
async fn device_mount_round_trips_open_end() {
    let store = setup().await;
    let config = configuration(&store, "Buoy").await;
    let dev = device(&store, "CTD").await;

    let created = store
        .device_mounts()
        .create(mount(config, dev, date(2022, 4, 5), None))
        .await
        .unwrap();
    assert_eq!(created.end_date, None);
    assert_eq!(created.offset_z, -0.5);

    let fetched = store.device_mounts().get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.begin_date, date(2022, 4, 5));
    assert_eq!(fetched.configuration_id, config);
    assert_eq!(fetched.device_id, dev);
}

#[tokio::test]
async fn device_mount_end_date_can_be_set_and_cleared() {
    let store = setup().await;
    let config = configuration(&store, "Buoy").await;
    let dev = device(&store, "CTD").await;
    let created = store
        .device_mounts()
        .create(mount(config, dev, date(2022, 4, 5), None))
        .await
        .unwrap();

    let closed = store
        .device_mounts()
        .update(
            created.id,
            UpdateDeviceMountAction {
                end_date: Some(Some(date(2022, 5, 5))),
                end_contact: Some(Some("bob".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.end_date, Some(date(2022, 5, 5)));
    assert_eq!(closed.end_contact.as_deref(), Some("bob"));

    let reopened = store
        .device_mounts()
        .update(
            created.id,
            UpdateDeviceMountAction {
                end_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reopened.end_date, None);
    assert_eq!(reopened.end_contact.as_deref(), Some("bob"));
}

#[tokio::test]
async fn updating_unknown_mount_is_not_found() {
    let store = setup().await;
    let err = store
        .device_mounts()
        .update(Uuid::new_v4(), UpdateDeviceMountAction::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn device_mounts_are_listed_by_device_across_configurations() {
    let store = setup().await;
    let first = configuration(&store, "First").await;
    let second = configuration(&store, "Second").await;
    let dev = device(&store, "CTD").await;
    let other = device(&store, "Other").await;

    store
        .device_mounts()
        .create(mount(second, dev, date(2023, 1, 1), None))
        .await
        .unwrap();
    store
        .device_mounts()
        .create(mount(first, dev, date(2022, 1, 1), Some(date(2022, 6, 1))))
        .await
        .unwrap();
    store
        .device_mounts()
        .create(mount(first, other, date(2022, 1, 1), None))
        .await
        .unwrap();

    let by_device = store.device_mounts().list_by_device(dev).await.unwrap();
    assert_eq!(by_device.len(), 2);
    assert_eq!(by_device[0].configuration_id, first);
    assert_eq!(by_device[1].configuration_id, second);

    let by_config = store
        .device_mounts()
        .list_by_configuration(first)
        .await
        .unwrap();
    assert_eq!(by_config.len(), 2);

    let pair = store
        .device_mounts()
        .list_by_configuration_and_device(first, dev)
        .await
        .unwrap();
    assert_eq!(pair.len(), 1);
    assert_eq!(pair[0].end_date, Some(date(2022, 6, 1)));
}

#[tokio::test]
async fn static_locations_are_listed_per_configuration() {
    let store = setup().await;
    let config = configuration(&store, "Station").await;
    let other = configuration(&store, "Elsewhere").await;

    for (cfg, begin) in [
        (config, date(2022, 3, 1)),
        (config, date(2021, 3, 1)),
        (other, date(2020, 1, 1)),
    ] {
        store
            .static_locations()
            .create(CreateStaticLocationAction {
                configuration_id: cfg,
                begin_date: begin,
                end_date: Some(begin + Duration::days(30)),
                x: Some(10.1),
                y: Some(54.5),
                z: None,
                epsg_code: Some("4326".into()),
                elevation_datum_name: None,
                begin_description: None,
                end_description: None,
            })
            .await
            .unwrap();
    }

    let actions = store
        .static_locations()
        .list_by_configuration(config)
        .await
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].begin_date, date(2021, 3, 1));
    assert_eq!(actions[1].begin_date, date(2022, 3, 1));

    let updated = store
        .static_locations()
        .update(
            actions[0].id,
            UpdateStaticLocationAction {
                z: Some(Some(3.0)),
                end_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.z, Some(3.0));
    assert_eq!(updated.end_date, None);

    store
        .static_locations()
        .delete(actions[1].id)
        .await
        .unwrap();
    let err = store
        .static_locations()
        .get_by_id(actions[1].id)
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn dynamic_location_property_can_be_cleared() {
    let store = setup().await;
    let config = configuration(&store, "Rover").await;
    let x_prop = Uuid::new_v4();

    let created = store
        .dynamic_locations()
        .create(CreateDynamicLocationAction {
            configuration_id: config,
            begin_date: date(2022, 9, 5),
            end_date: None,
            x_property_id: Some(x_prop),
            y_property_id: None,
            z_property_id: None,
            epsg_code: None,
            elevation_datum_name: None,
            begin_description: None,
            end_description: None,
        })
        .await
        .unwrap();
    assert_eq!(created.x_property_id, Some(x_prop));

    let updated = store
        .dynamic_locations()
        .update(
            created.id,
            UpdateDynamicLocationAction {
                x_property_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.x_property_id, None);
    assert_eq!(updated.property_refs().iter().count(), 0);
}

#[tokio::test]
async fn activity_is_recorded_and_counted_per_day() {
    let store = setup().await;
    let config = configuration(&store, "Buoy").await;
    let entity_id = Uuid::new_v4();

    for kind in [ActivityKind::Create, ActivityKind::Update, ActivityKind::Delete] {
        store
            .activity()
            .record(CreateActivityLogEntry {
                actor: "alice".into(),
                action: kind,
                entity: "device_mount_action".into(),
                entity_id,
                configuration_id: Some(config),
                description: format!("{} device mount", kind.as_str()),
            })
            .await
            .unwrap();
    }

    let now = Utc::now();
    let entries = store
        .activity()
        .list_between(now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].action, ActivityKind::Create);
    assert_eq!(entries[2].action, ActivityKind::Delete);
    assert_eq!(entries[0].entity_id, entity_id);

    let counts = store
        .activity()
        .daily_counts(now - Duration::days(2), now + Duration::days(2))
        .await
        .unwrap();
    let total: u64 = counts.iter().map(|c| c.count).sum();
    assert_eq!(total, 3);
    assert!(counts.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn daily_counts_outside_range_are_empty() {
    let store = setup().await;
    store
        .activity()
        .record(CreateActivityLogEntry {
            actor: "alice".into(),
            action: ActivityKind::Create,
            entity: "static_location_action".into(),
            entity_id: Uuid::new_v4(),
            configuration_id: None,
            description: "created static location".into(),
        })
        .await
        .unwrap();

    let counts = store
        .activity()
        .daily_counts(date(2000, 1, 1), date(2000, 12, 31))
        .await
        .unwrap();
    assert!(counts.is_empty());
}
