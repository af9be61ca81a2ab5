mod common;

use common::sqlite_db;
use products_hr::dto::{NewPermission, PermissionResponse};
use products_hr::seed::{SYSTEM_PERMISSIONS, ensure_system_permissions, permission_name};
use products_hr::{HrError, PermissionService};

fn custom(name: &str, resource: &str, action: &str) -> NewPermission {
    NewPermission {
        name: name.into(),
        description: Some("Custom grant".into()),
        resource: resource.into(),
        action: action.into(),
        system_permission: false,
    }
}

#[tokio::test]
async fn create_list_and_delete_custom_permission() {
    let db = sqlite_db().await;
    let service = PermissionService::new(&db);

    let created = service
        .create(custom("  report:export ", "report", "export"))
        .await
        .unwrap();
    assert_eq!(created.name, "report:export");
    assert!(!created.is_system_permission);
    assert_eq!(created.created_at, created.updated_at);

    service
        .create(custom("audit:read", "audit", "read"))
        .await
        .unwrap();
    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["audit:read", "report:export"]);

    let found = service.find_by_name("report:export").await.unwrap();
    assert_eq!(found.map(|p| p.id), Some(created.id));

    service.delete(created.id).await.unwrap();
    let err = service.get(created.id).await.unwrap_err();
    assert!(matches!(err, HrError::PermissionNotFound(id) if id == created.id));
}

#[tokio::test]
async fn duplicates_are_refused() {
    let db = sqlite_db().await;
    let service = PermissionService::new(&db);
    service
        .create(custom("report:export", "report", "export"))
        .await
        .unwrap();

    let err = service
        .create(custom("report:export", "report", "download"))
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::DuplicatePermission(name) if name == "report:export"));

    let err = service
        .create(custom("export-reports", "report", "export"))
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::DuplicatePermission(label) if label == "report:export"));
}

#[tokio::test]
async fn blank_fields_fail_validation() {
    let db = sqlite_db().await;
    let err = PermissionService::new(&db)
        .create(custom("x", "  ", "read"))
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Validation(message) if message == "resource is required"));
}

#[tokio::test]
async fn system_permissions_cannot_be_deleted() {
    let db = sqlite_db().await;
    let seeded = ensure_system_permissions(&db).await.unwrap();
    assert_eq!(seeded.len(), SYSTEM_PERMISSIONS.len());
    // second run inserts nothing new
    let again = ensure_system_permissions(&db).await.unwrap();
    assert_eq!(again.len(), seeded.len());

    let service = PermissionService::new(&db);
    let approve = service
        .find_by_name(&permission_name("employee_exit", "approve"))
        .await
        .unwrap()
        .unwrap();
    assert!(approve.is_system_permission);
    let err = service.delete(approve.id).await.unwrap_err();
    assert!(matches!(err, HrError::SystemPermission(id) if id == approve.id));
    assert!(service.get(approve.id).await.is_ok());

    let response = PermissionResponse::from(approve);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["isSystemPermission"], true);
    assert_eq!(json["resource"], "employee_exit");
}

#[tokio::test]
async fn concurrent_duplicates_report_conflict_not_db_error() {
    let db = sqlite_db().await;
    let service = PermissionService::new(&db);

    let (a, b) = tokio::join!(
        service.create(custom("report:export", "report", "export")),
        service.create(custom("export-reports", "report", "export")),
    );
    let (created, refused) = match (a, b) {
        (Ok(created), Err(err)) | (Err(err), Ok(created)) => (created, err),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert_eq!(created.resource, "report");
    assert!(
        matches!(refused, HrError::DuplicatePermission(_)),
        "got {refused:?}"
    );
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn system_seeding_tolerates_custom_permission_on_builtin_pair() {
    let db = sqlite_db().await;
    let service = PermissionService::new(&db);
    service
        .create(custom("approve-exits", "employee_exit", "approve"))
        .await
        .unwrap();

    let seeded = ensure_system_permissions(&db).await.unwrap();
    assert_eq!(seeded.len(), SYSTEM_PERMISSIONS.len() - 1);
    assert!(
        seeded
            .iter()
            .all(|p| p.name != permission_name("employee_exit", "approve"))
    );

    let again = ensure_system_permissions(&db).await.unwrap();
    assert_eq!(again.len(), seeded.len());
    let custom = service.find_by_name("approve-exits").await.unwrap().unwrap();
    assert!(!custom.is_system_permission);
}
