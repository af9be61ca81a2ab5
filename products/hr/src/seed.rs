//! Demo data for local environments and integration tests.

use chrono::NaiveDate;
use entity::{audit_now, employee_exits, employees, permissions};
use sea_orm::{
    ActiveModelBehavior, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::OnConflict,
};
use tracing::info;

use crate::dto::{ExitFilter, NewEmployee, NewExit};
use crate::employees::EmployeeService;
use crate::error::HrResult;
use crate::exits::ExitService;

/// `(resource, action, description)` rows every installation ships with.
pub const SYSTEM_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("employee", "read", "View employee records"),
    ("employee", "write", "Create and edit employee records"),
    ("employee_exit", "read", "View exit requests"),
    ("employee_exit", "initiate", "Open an exit request"),
    ("employee_exit", "approve", "Approve or reject exit requests"),
    ("employee_exit", "complete", "Close approved exits"),
    ("permission", "manage", "Maintain the permission catalogue"),
];

pub struct SeededHrRecords {
    pub employees: Vec<employees::Model>,
    pub exits: Vec<employee_exits::Model>,
    pub permissions: Vec<permissions::Model>,
}

impl SeededHrRecords {
    pub fn employee_code(&self, code: &str) -> Option<&employees::Model> {
        self.employees.iter().find(|e| e.employee_code == code)
    }

    pub fn permission_named(&self, name: &str) -> Option<&permissions::Model> {
        self.permissions.iter().find(|p| p.name == name)
    }
}

pub fn permission_name(resource: &str, action: &str) -> String {
    format!("{resource}:{action}")
}

/// Inserts the system permissions, if missing. Safe to run repeatedly.
pub async fn ensure_system_permissions<C>(db: &C) -> Result<Vec<permissions::Model>, DbErr>
where
    C: ConnectionTrait,
{
    for (resource, action, description) in SYSTEM_PERMISSIONS {
        let mut row = permissions::ActiveModel::new();
        row.name = Set(permission_name(resource, action));
        row.description = Set(Some((*description).to_string()));
        row.resource = Set((*resource).to_string());
        row.action = Set((*action).to_string());
        row.is_system_permission = Set(true);
        // Bulk inserts skip `before_save`, so stamp the audit columns here.
        let now = audit_now();
        row.created_at = Set(now);
        row.updated_at = Set(now);
        // No conflict target: a custom permission may already hold the name
        // or the resource/action pair, and either one means "present".
        permissions::Entity::insert(row)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }
    let names: Vec<String> = SYSTEM_PERMISSIONS
        .iter()
        .map(|(resource, action, _)| permission_name(resource, action))
        .collect();
    permissions::Entity::find()
        .filter(permissions::Column::Name.is_in(names))
        .all(db)
        .await
}

pub async fn seed_demo<C>(db: &C) -> HrResult<SeededHrRecords>
where
    C: ConnectionTrait + TransactionTrait,
{
    let permissions = ensure_system_permissions(db).await?;

    let people = [
        ("E-1001", "Grace", "Hopper", "Engineering", "Engineering Manager", (2019, 4, 1)),
        ("E-1002", "Alan", "Turing", "Engineering", "Software Engineer", (2021, 9, 13)),
        ("E-1003", "Ada", "Lovelace", "People", "HR Partner", (2020, 1, 6)),
    ];
    let staff = EmployeeService::new(db);
    let mut seeded = Vec::with_capacity(people.len());
    for (code, first, last, department, title, (y, m, d)) in people {
        let existing = employees::Entity::find()
            .filter(employees::Column::EmployeeCode.eq(code))
            .one(db)
            .await?;
        let employee = match existing {
            Some(employee) => employee,
            None => {
                staff
                    .create(NewEmployee {
                        employee_code: code.into(),
                        first_name: first.into(),
                        last_name: last.into(),
                        email: format!("{}@hrms.test", first.to_lowercase()),
                        department: Some(department.into()),
                        job_title: Some(title.into()),
                        hire_date: date(y, m, d),
                    })
                    .await?
            }
        };
        seeded.push(employee);
    }

    let exits = ExitService::new(db);
    let leaver = seeded[1].id;
    let earlier = exits
        .list(ExitFilter {
            employee_id: Some(leaver),
            status: None,
        })
        .await?;
    let exit = match earlier.into_iter().next() {
        Some(exit) => exit,
        None => {
            let exit = exits
                .initiate(NewExit {
                    employee_id: leaver,
                    resignation_date: date(2024, 6, 3),
                    last_working_day: date(2024, 7, 31),
                    exit_reason: Some("Relocating abroad".into()),
                    notes: None,
                })
                .await?;
            exits.submit(exit.id).await?
        }
    };

    info!(
        employees = seeded.len(),
        permissions = permissions.len(),
        "hr demo data seeded"
    );
    Ok(SeededHrRecords {
        employees: seeded,
        exits: vec![exit],
        permissions,
    })
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
