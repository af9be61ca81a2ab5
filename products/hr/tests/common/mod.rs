#![allow(dead_code)]

use chrono::NaiveDate;
use entity::employees;
use products_hr::EmployeeService;
use products_hr::dto::NewEmployee;
use sea_orm::{Database, DatabaseConnection};

pub async fn sqlite_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::sqlite::bootstrap(&db).await.unwrap();
    db
}

pub async fn hire(db: &DatabaseConnection, code: &str, first: &str, last: &str) -> employees::Model {
    EmployeeService::new(db)
        .create(NewEmployee {
            employee_code: code.into(),
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@example.test", code.to_lowercase()),
            department: Some("Engineering".into()),
            job_title: None,
            hire_date: NaiveDate::from_ymd_opt(2022, 2, 1),
        })
        .await
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
