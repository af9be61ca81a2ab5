use sea_orm_migration::prelude::*;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS employee_exits (
    id bigserial PRIMARY KEY,
    employee_id bigint NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    approved_by bigint NULL REFERENCES employees(id) ON DELETE SET NULL,
    resignation_date date NULL,
    last_working_day date NULL,
    approval_date date NULL,
    exit_reason text NULL,
    notes text NULL,
    status varchar(16) NOT NULL DEFAULT 'INITIATED'
        CHECK (status IN ('INITIATED','PENDING','APPROVED','REJECTED','WITHDRAWN','COMPLETED')),
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_employee_exits_employee ON employee_exits (employee_id);
CREATE INDEX IF NOT EXISTS idx_employee_exits_status ON employee_exits (status);
CREATE UNIQUE INDEX IF NOT EXISTS uq_employee_exits_one_open ON employee_exits (employee_id)
    WHERE status IN ('INITIATED','PENDING','APPROVED');
"#;

const DOWN_SQL: &str = r#"
DROP INDEX IF EXISTS uq_employee_exits_one_open;
DROP INDEX IF EXISTS idx_employee_exits_status;
DROP INDEX IF EXISTS idx_employee_exits_employee;
DROP TABLE IF EXISTS employee_exits;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
