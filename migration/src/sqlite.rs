//! SQLite rendition of the schema for in-memory test databases.
//!
//! Mirrors the Postgres migrations table by table. Keep both in step.

use sea_orm_migration::sea_orm::{ConnectionTrait, DbErr};

pub const SCHEMA: &[&str] = &[
    "PRAGMA foreign_keys = ON",
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_code TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        department TEXT,
        job_title TEXT,
        hire_date TEXT,
        is_active BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee_exits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
        approved_by INTEGER REFERENCES employees(id) ON DELETE SET NULL,
        resignation_date TEXT,
        last_working_day TEXT,
        approval_date TEXT,
        exit_reason TEXT,
        notes TEXT,
        status TEXT NOT NULL DEFAULT 'INITIATED'
            CHECK (status IN ('INITIATED','PENDING','APPROVED','REJECTED','WITHDRAWN','COMPLETED')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_employee_exits_employee ON employee_exits (employee_id)",
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS uq_employee_exits_one_open ON employee_exits (employee_id)
        WHERE status IN ('INITIATED','PENDING','APPROVED')
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT,
        resource TEXT NOT NULL,
        action TEXT NOT NULL,
        is_system_permission BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (resource, action)
    )
    "#,
];

pub async fn bootstrap<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    for statement in SCHEMA {
        db.execute_unprepared(statement).await?;
    }
    Ok(())
}
