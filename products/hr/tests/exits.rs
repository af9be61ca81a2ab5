mod common;

use std::time::Duration;

use common::{day, hire, sqlite_db};
use entity::{ExitStatus, employee_exits, employees};
use products_hr::dto::{ExitDetails, ExitFilter, NewExit};
use products_hr::{EmployeeService, ExitAction, ExitService, HrError};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, Set, SqlErr,
};

async fn open_exit(db: &DatabaseConnection, employee_id: i64) -> employee_exits::Model {
    ExitService::new(db)
        .initiate(NewExit {
            employee_id,
            resignation_date: day(2024, 6, 3),
            last_working_day: day(2024, 7, 31),
            exit_reason: Some("  Relocating  ".into()),
            notes: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn full_lifecycle_ends_with_inactive_employee() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let manager = hire(&db, "E-2", "Grace", "Hopper").await;
    let exits = ExitService::new(&db);

    let exit = open_exit(&db, leaver.id).await;
    assert_eq!(exit.status, ExitStatus::Initiated);
    assert_eq!(exit.exit_reason.as_deref(), Some("Relocating"));
    assert!(exit.approved_by.is_none());

    let exit = exits.submit(exit.id).await.unwrap();
    assert_eq!(exit.status, ExitStatus::Pending);

    let exit = exits
        .approve(exit.id, manager.id, day(2024, 6, 5))
        .await
        .unwrap();
    assert_eq!(exit.status, ExitStatus::Approved);
    assert_eq!(exit.approved_by, Some(manager.id));
    assert_eq!(exit.approval_date, day(2024, 6, 5));
    assert!(exit.can_be_completed());

    let exit = exits.complete(exit.id).await.unwrap();
    assert_eq!(exit.status, ExitStatus::Completed);

    let employee = EmployeeService::new(&db).get(leaver.id).await.unwrap();
    assert!(!employee.is_active);
    let approver = exit
        .find_linked(employee_exits::ApproverLink)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approver.id, manager.id);
}

#[tokio::test]
async fn illegal_transition_leaves_row_untouched() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);
    let exit = open_exit(&db, leaver.id).await;
    let withdrawn = exits.withdraw(exit.id).await.unwrap();
    assert_eq!(withdrawn.status, ExitStatus::Withdrawn);

    let err = exits.complete(exit.id).await.unwrap_err();
    assert!(matches!(
        err,
        HrError::InvalidTransition {
            from: ExitStatus::Withdrawn,
            action: ExitAction::Complete,
            ..
        }
    ));
    let err = exits.submit(exit.id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("cannot submit exit {} while it is WITHDRAWN", exit.id)
    );

    let after = exits.get(exit.id).await.unwrap();
    assert_eq!(after, withdrawn);
    let employee = EmployeeService::new(&db).get(leaver.id).await.unwrap();
    assert!(employee.is_active);
}

#[tokio::test]
async fn approval_requires_open_exit_and_another_reviewer() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let manager = hire(&db, "E-2", "Grace", "Hopper").await;
    let exits = ExitService::new(&db);
    let exit = open_exit(&db, leaver.id).await;

    let err = exits.approve(exit.id, leaver.id, None).await.unwrap_err();
    assert!(matches!(err, HrError::Validation(_)));
    let err = exits.approve(exit.id, 9_999, None).await.unwrap_err();
    assert!(matches!(err, HrError::EmployeeNotFound(9_999)));

    let err = exits.complete(exit.id).await.unwrap_err();
    assert!(matches!(
        err,
        HrError::InvalidTransition {
            from: ExitStatus::Initiated,
            ..
        }
    ));

    let approved = exits.approve(exit.id, manager.id, None).await.unwrap();
    assert!(approved.approval_date.is_some());
    let err = exits.withdraw(exit.id).await.unwrap_err();
    assert!(matches!(
        err,
        HrError::InvalidTransition {
            from: ExitStatus::Approved,
            action: ExitAction::Withdraw,
            ..
        }
    ));
}

#[tokio::test]
async fn rejection_records_reviewer_and_note() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let manager = hire(&db, "E-2", "Grace", "Hopper").await;
    let exits = ExitService::new(&db);
    let exit = open_exit(&db, leaver.id).await;
    exits
        .update_details(
            exit.id,
            ExitDetails {
                notes: Some("Counter-offer made".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rejected = exits
        .reject(exit.id, manager.id, Some("Notice period too short".into()))
        .await
        .unwrap();
    assert_eq!(rejected.status, ExitStatus::Rejected);
    assert_eq!(rejected.approved_by, Some(manager.id));
    assert_eq!(
        rejected.notes.as_deref(),
        Some("Counter-offer made\nNotice period too short")
    );

    let err = exits
        .update_details(exit.id, ExitDetails::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HrError::ExitClosed {
            status: ExitStatus::Rejected,
            ..
        }
    ));
}

#[tokio::test]
async fn only_one_open_exit_per_employee() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);
    let first = open_exit(&db, leaver.id).await;

    let err = exits
        .initiate(NewExit {
            employee_id: leaver.id,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HrError::OpenExitExists { exit_id, .. } if exit_id == first.id
    ));

    exits.withdraw(first.id).await.unwrap();
    let second = open_exit(&db, leaver.id).await;
    assert_ne!(second.id, first.id);

    let listed = exits
        .list(ExitFilter {
            employee_id: Some(leaver.id),
            status: Some(ExitStatus::Withdrawn),
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.id);
    let all = exits
        .list(ExitFilter {
            employee_id: Some(leaver.id),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn initiate_validates_employee_and_dates() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);

    let err = exits
        .initiate(NewExit {
            employee_id: 404,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::EmployeeNotFound(404)));

    let err = exits
        .initiate(NewExit {
            employee_id: leaver.id,
            resignation_date: day(2024, 6, 3),
            last_working_day: day(2024, 6, 2),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Validation(_)));

    let err = exits.get(77).await.unwrap_err();
    assert!(matches!(err, HrError::ExitNotFound(77)));
    let err = exits.withdraw(77).await.unwrap_err();
    assert!(matches!(err, HrError::ExitNotFound(77)));
}

#[tokio::test]
async fn insert_stamps_equal_times_and_update_moves_only_updated_at() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);
    let created = open_exit(&db, leaver.id).await;
    let stored = exits.get(created.id).await.unwrap();
    assert_eq!(stored.created_at, stored.updated_at);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut active: employee_exits::ActiveModel = stored.clone().into();
    active.notes = Set(Some("Laptop returned".into()));
    active.update(&db).await.unwrap();

    let touched = exits.get(created.id).await.unwrap();
    assert_eq!(touched.created_at, stored.created_at);
    assert!(touched.updated_at > stored.updated_at);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let submitted = exits.submit(created.id).await.unwrap();
    assert_eq!(submitted.created_at, stored.created_at);
    assert!(submitted.updated_at > touched.updated_at);
}

#[tokio::test]
async fn guards_are_advisory_at_the_entity_layer() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exit = open_exit(&db, leaver.id).await;

    // Writing the model directly bypasses the workflow entirely.
    let mut active: employee_exits::ActiveModel = exit.into();
    active.status = Set(ExitStatus::Completed);
    let forced = active.update(&db).await.unwrap();
    assert_eq!(forced.status, ExitStatus::Completed);
    assert!(!forced.can_be_withdrawn());

    let employee = employees::Entity::find_by_id(leaver.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(employee.is_active);
}

#[tokio::test]
async fn deleting_employee_cascades_to_exits() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let manager = hire(&db, "E-2", "Grace", "Hopper").await;
    let exits = ExitService::new(&db);
    let other = hire(&db, "E-3", "Ada", "Lovelace").await;
    let approved = open_exit(&db, other.id).await;
    exits.approve(approved.id, manager.id, None).await.unwrap();
    open_exit(&db, leaver.id).await;

    leaver.delete(&db).await.unwrap();
    let remaining = exits.list(ExitFilter::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);

    manager.delete(&db).await.unwrap();
    let orphaned = exits.get(approved.id).await.unwrap();
    assert_eq!(orphaned.approved_by, None);
    assert_eq!(orphaned.status, ExitStatus::Approved);
}

#[tokio::test]
async fn concurrent_initiates_leave_one_open_exit() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);
    let request = || NewExit {
        employee_id: leaver.id,
        resignation_date: day(2024, 6, 3),
        ..Default::default()
    };

    let (a, b) = tokio::join!(exits.initiate(request()), exits.initiate(request()));
    let (opened, refused) = match (a, b) {
        (Ok(opened), Err(err)) | (Err(err), Ok(opened)) => (opened, err),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert!(
        matches!(refused, HrError::OpenExitExists { exit_id, .. } if exit_id == opened.id),
        "got {refused:?}"
    );

    let open = exits
        .list(ExitFilter {
            employee_id: Some(leaver.id),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn schema_refuses_second_open_exit_written_directly() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let first = open_exit(&db, leaver.id).await;

    let mut second = employee_exits::ActiveModel::new();
    second.employee_id = Set(leaver.id);
    let err = second.insert(&db).await.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));

    // Closed exits do not count against the index.
    ExitService::new(&db).withdraw(first.id).await.unwrap();
    let mut third = employee_exits::ActiveModel::new();
    third.employee_id = Set(leaver.id);
    let reopened = third.insert(&db).await.unwrap();
    assert_eq!(reopened.status, ExitStatus::Initiated);
}

#[tokio::test]
async fn detail_edits_racing_a_withdrawal_never_touch_a_closed_exit() {
    let db = sqlite_db().await;
    let leaver = hire(&db, "E-1", "Alan", "Turing").await;
    let exits = ExitService::new(&db);
    let exit = open_exit(&db, leaver.id).await;

    let (edited, withdrawn) = tokio::join!(
        exits.update_details(
            exit.id,
            ExitDetails {
                notes: Some("Handover booked".into()),
                ..Default::default()
            },
        ),
        exits.withdraw(exit.id),
    );
    let withdrawn = withdrawn.unwrap();
    assert_eq!(withdrawn.status, ExitStatus::Withdrawn);
    match edited {
        Ok(_) => {
            let stored = exits.get(exit.id).await.unwrap();
            assert_eq!(stored.notes.as_deref(), Some("Handover booked"));
        }
        Err(err) => assert!(
            matches!(
                err,
                HrError::ExitClosed {
                    status: ExitStatus::Withdrawn,
                    ..
                }
            ),
            "got {err:?}"
        ),
    }

    let err = exits
        .update_details(
            exit.id,
            ExitDetails {
                notes: Some("Too late".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::ExitClosed { .. }));
    let stored = exits.get(exit.id).await.unwrap();
    assert_ne!(stored.notes.as_deref(), Some("Too late"));
}
