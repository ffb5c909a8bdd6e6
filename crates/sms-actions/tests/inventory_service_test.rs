//! Integration tests for the inventory service using in-memory SurrealDB.

use sms_actions::InventoryService;
use sms_core::authz::StaticPermissionGroups;
use sms_core::error::SmsError;
use sms_core::models::configuration::{
    ConfigurationStatus, CreateConfiguration, UpdateConfiguration,
};
use sms_core::models::device::{CreateDevice, UpdateDevice};
use sms_core::models::device_property::{CreateDeviceProperty, UpdateDeviceProperty};
use sms_core::models::platform::CreatePlatform;
use sms_core::models::principal::Principal;
use sms_core::models::visibility::Visibility;
use sms_db::SurrealStore;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Service = InventoryService<SurrealStore<Db>, StaticPermissionGroups>;

async fn setup() -> Service {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sms_db::run_migrations(&db).await.unwrap();

    let groups = StaticPermissionGroups::new()
        .add_member("alice", "hydro")
        .add_admin("bob", "hydro")
        .add_member("carol", "soil");
    InventoryService::new(SurrealStore::new(db), groups)
}

fn alice() -> Principal {
    Principal::new("alice")
}

fn bob() -> Principal {
    Principal::new("bob")
}

fn carol() -> Principal {
    Principal::new("carol")
}

fn new_device(short_name: &str, groups: &[&str], visibility: Visibility) -> CreateDevice {
    CreateDevice {
        short_name: short_name.into(),
        long_name: None,
        serial_number: Some("SN-001".into()),
        manufacturer_name: None,
        model: None,
        group_ids: groups.iter().map(|g| g.to_string()).collect(),
        visibility,
        created_by: "ignored".into(),
    }
}

fn new_configuration(label: &str, group: Option<&str>) -> CreateConfiguration {
    CreateConfiguration {
        label: label.into(),
        description: None,
        status: ConfigurationStatus::Draft,
        permission_group: group.map(str::to_string),
        visibility: Visibility::Public,
        created_by: "ignored".into(),
    }
}

fn new_property(device_id: uuid::Uuid, name: &str) -> CreateDeviceProperty {
    CreateDeviceProperty {
        device_id,
        property_name: name.into(),
        label: None,
        unit_name: Some("°C".into()),
        resolution: None,
        accuracy: None,
    }
}

// ---------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------

#[tokio::test]
async fn creator_is_taken_from_the_principal() {
    let service = setup().await;
    let device = service
        .create_device(&alice(), new_device("CTD", &["hydro"], Visibility::Internal))
        .await
        .unwrap();
    assert_eq!(device.created_by, "alice");
    assert!(!device.archived);
}

#[tokio::test]
async fn groups_outside_own_memberships_are_rejected() {
    let service = setup().await;
    let err = service
        .create_device(&carol(), new_device("CTD", &["hydro"], Visibility::Internal))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    service
        .create_device(
            &Principal::superuser("root"),
            new_device("CTD", &["hydro", "soil"], Visibility::Internal),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let service = setup().await;
    let err = service
        .create_platform(
            &alice(),
            CreatePlatform {
                short_name: "  ".into(),
                long_name: None,
                serial_number: None,
                manufacturer_name: None,
                model: None,
                group_ids: vec![],
                visibility: Visibility::Public,
                created_by: "ignored".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::Validation { .. }));
}

#[tokio::test]
async fn configurations_cannot_be_private() {
    let service = setup().await;
    let mut input = new_configuration("Tower", None);
    input.visibility = Visibility::Private;
    let err = service
        .create_configuration(&alice(), input)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 422);

    let configuration = service
        .create_configuration(&alice(), new_configuration("Tower", None))
        .await
        .unwrap();
    let err = service
        .update_configuration(
            &alice(),
            configuration.id,
            UpdateConfiguration {
                visibility: Some(Visibility::Private),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 422);
}

// ---------------------------------------------------------------------
// Archival
// ---------------------------------------------------------------------

#[tokio::test]
async fn only_group_admins_archive() {
    let service = setup().await;
    let device = service
        .create_device(&alice(), new_device("CTD", &["hydro"], Visibility::Internal))
        .await
        .unwrap();

    let err = service.archive_device(&alice(), device.id).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let archived = service.archive_device(&bob(), device.id).await.unwrap();
    assert!(archived.archived);

    let restored = service.restore_device(&bob(), device.id).await.unwrap();
    assert!(!restored.archived);
}

#[tokio::test]
async fn archived_resources_reject_edits_and_deletion() {
    let service = setup().await;
    let device = service
        .create_device(&alice(), new_device("CTD", &["hydro"], Visibility::Internal))
        .await
        .unwrap();
    service.archive_device(&bob(), device.id).await.unwrap();

    let err = service
        .update_device(
            &bob(),
            device.id,
            UpdateDevice {
                long_name: Some(Some("Conductivity probe".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    let err = service.delete_device(&bob(), device.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    let err = service
        .create_device_property(&bob(), new_property(device.id, "Temperature"))
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));
}

#[tokio::test]
async fn ungrouped_configuration_is_administered_by_its_creator() {
    let service = setup().await;
    let configuration = service
        .create_configuration(&carol(), new_configuration("Field", None))
        .await
        .unwrap();

    // Anyone may edit...
    service
        .update_configuration(
            &alice(),
            configuration.id,
            UpdateConfiguration {
                status: Some(ConfigurationStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // ...but only the creator may archive.
    let err = service
        .archive_configuration(&alice(), configuration.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    service
        .archive_configuration(&carol(), configuration.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn deletion_needs_admin_rights() {
    let service = setup().await;
    let configuration = service
        .create_configuration(&alice(), new_configuration("Lake", Some("hydro")))
        .await
        .unwrap();

    let err = service
        .delete_configuration(&alice(), configuration.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    service
        .delete_configuration(&bob(), configuration.id)
        .await
        .unwrap();
    let err = service
        .get_configuration(Some(&bob()), configuration.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn platform_lifecycle() {
    let service = setup().await;
    let platform = service
        .create_platform(
            &alice(),
            CreatePlatform {
                short_name: "Mast".into(),
                long_name: Some("Weather mast".into()),
                serial_number: None,
                manufacturer_name: None,
                model: None,
                group_ids: vec!["hydro".into()],
                visibility: Visibility::Public,
                created_by: "ignored".into(),
            },
        )
        .await
        .unwrap();

    let fetched = service.get_platform(None, platform.id).await.unwrap();
    assert_eq!(fetched.long_name.as_deref(), Some("Weather mast"));

    service.archive_platform(&bob(), platform.id).await.unwrap();
    let err = service.delete_platform(&bob(), platform.id).await.unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    service.restore_platform(&bob(), platform.id).await.unwrap();
    service.delete_platform(&bob(), platform.id).await.unwrap();
    let err = service.get_platform(None, platform.id).await.unwrap_err();
    assert!(matches!(err, SmsError::NotFound { .. }));
}

#[tokio::test]
async fn restored_configuration_accepts_edits_again() {
    let service = setup().await;
    let configuration = service
        .create_configuration(&alice(), new_configuration("Lake", Some("hydro")))
        .await
        .unwrap();
    service
        .archive_configuration(&bob(), configuration.id)
        .await
        .unwrap();

    let edit = UpdateConfiguration {
        description: Some(Some("Lake monitoring buoy".into())),
        ..Default::default()
    };
    let err = service
        .update_configuration(&alice(), configuration.id, edit.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, SmsError::Conflict { .. }));

    let err = service
        .restore_configuration(&alice(), configuration.id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    service
        .restore_configuration(&bob(), configuration.id)
        .await
        .unwrap();

    let updated = service
        .update_configuration(&alice(), configuration.id, edit)
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Lake monitoring buoy"));
}

// ---------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------

#[tokio::test]
async fn visibility_controls_reads() {
    let service = setup().await;
    let public = service
        .create_device(&alice(), new_device("Public", &[], Visibility::Public))
        .await
        .unwrap();
    let internal = service
        .create_device(&alice(), new_device("Internal", &[], Visibility::Internal))
        .await
        .unwrap();
    let private = service
        .create_device(&alice(), new_device("Private", &[], Visibility::Private))
        .await
        .unwrap();

    service.get_device(None, public.id).await.unwrap();
    assert_eq!(
        service.get_device(None, internal.id).await.unwrap_err().status_code(),
        403
    );
    service.get_device(Some(&carol()), internal.id).await.unwrap();

    service.get_device(Some(&alice()), private.id).await.unwrap();
    service
        .get_device(Some(&Principal::superuser("root")), private.id)
        .await
        .unwrap();
    assert_eq!(
        service
            .get_device(Some(&carol()), private.id)
            .await
            .unwrap_err()
            .status_code(),
        403
    );
}

// ---------------------------------------------------------------------
// Device properties
// ---------------------------------------------------------------------

#[tokio::test]
async fn properties_follow_their_device_permissions() {
    let service = setup().await;
    let device = service
        .create_device(&alice(), new_device("CTD", &["hydro"], Visibility::Internal))
        .await
        .unwrap();

    let err = service
        .create_device_property(&carol(), new_property(device.id, "Temperature"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);

    let property = service
        .create_device_property(&alice(), new_property(device.id, "Temperature"))
        .await
        .unwrap();
    let updated = service
        .update_device_property(
            &alice(),
            property.id,
            UpdateDeviceProperty {
                unit_name: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.unit_name, None);

    let listed = service
        .list_device_properties(Some(&carol()), device.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    service
        .delete_device_property(&alice(), property.id)
        .await
        .unwrap();
    assert!(
        service
            .list_device_properties(Some(&alice()), device.id)
            .await
            .unwrap()
            .is_empty()
    );
}
