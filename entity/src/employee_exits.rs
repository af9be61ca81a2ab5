use std::{fmt, str::FromStr};

use sea_orm::ActiveValue::Set;
use sea_orm::Iterable;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One employee's offboarding case.
///
/// The `can_be_*` guards are advisory: nothing at this layer stops a caller
/// from writing an arbitrary `status` through the active model. The exit
/// workflow in `products-hr` is what enforces them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee_exits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub employee_id: i64,
    pub approved_by: Option<i64>,
    pub resignation_date: Option<Date>,
    pub last_working_day: Option<Date>,
    pub approval_date: Option<Date>,
    #[sea_orm(column_type = "Text", nullable)]
    pub exit_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: ExitStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn can_be_approved(&self) -> bool {
        matches!(self.status, ExitStatus::Initiated | ExitStatus::Pending)
    }

    pub fn can_be_withdrawn(&self) -> bool {
        matches!(self.status, ExitStatus::Initiated | ExitStatus::Pending)
    }

    pub fn can_be_completed(&self) -> bool {
        self.status == ExitStatus::Approved
    }

    pub fn can_be_submitted(&self) -> bool {
        self.status == ExitStatus::Initiated
    }

    pub fn can_be_rejected(&self) -> bool {
        self.can_be_approved()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::ApprovedBy",
        to = "super::employees::Column::Id",
        on_delete = "SetNull"
    )]
    Approver,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

/// Follows `approved_by` instead of the owning employee.
#[derive(Debug)]
pub struct ApproverLink;

impl Linked for ApproverLink {
    type FromEntity = Entity;
    type ToEntity = super::employees::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![Relation::Approver.def()]
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitStatus {
    #[default]
    #[sea_orm(string_value = "INITIATED")]
    Initiated,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "WITHDRAWN")]
    Withdrawn,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl ExitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitStatus::Initiated => "INITIATED",
            ExitStatus::Pending => "PENDING",
            ExitStatus::Approved => "APPROVED",
            ExitStatus::Rejected => "REJECTED",
            ExitStatus::Withdrawn => "WITHDRAWN",
            ExitStatus::Completed => "COMPLETED",
        }
    }

    /// Still in flight: an employee may hold at most one open exit.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ExitStatus::Initiated | ExitStatus::Pending | ExitStatus::Approved
        )
    }

    pub fn open_statuses() -> Vec<ExitStatus> {
        ExitStatus::iter().filter(|status| status.is_open()).collect()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown exit status `{0}`")]
pub struct UnknownExitStatus(pub String);

impl FromStr for ExitStatus {
    type Err = UnknownExitStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let upper = value.trim().to_ascii_uppercase();
        ExitStatus::iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| UnknownExitStatus(value.to_string()))
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            status: Set(ExitStatus::default()),
            ..<Self as ActiveModelTrait>::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = crate::audit_now();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exit_with(status: ExitStatus) -> Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        Model {
            id: 1,
            employee_id: 7,
            approved_by: None,
            resignation_date: None,
            last_working_day: None,
            approval_date: None,
            exit_reason: None,
            notes: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn approve_and_withdraw_only_while_initiated_or_pending() {
        for status in ExitStatus::iter() {
            let exit = exit_with(status);
            let expected = matches!(status, ExitStatus::Initiated | ExitStatus::Pending);
            assert_eq!(exit.can_be_approved(), expected, "approve from {status}");
            assert_eq!(exit.can_be_withdrawn(), expected, "withdraw from {status}");
        }
    }

    #[test]
    fn complete_only_when_approved() {
        for status in ExitStatus::iter() {
            let exit = exit_with(status);
            assert_eq!(
                exit.can_be_completed(),
                status == ExitStatus::Approved,
                "complete from {status}"
            );
        }
    }

    #[test]
    fn completion_ignores_missing_last_working_day() {
        let exit = exit_with(ExitStatus::Approved);
        assert!(exit.last_working_day.is_none());
        assert!(exit.can_be_completed());
    }

    #[test]
    fn new_active_model_defaults_to_initiated() {
        let active = ActiveModel::new();
        assert_eq!(active.status, Set(ExitStatus::Initiated));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("pending".parse::<ExitStatus>(), Ok(ExitStatus::Pending));
        assert_eq!(" APPROVED ".parse::<ExitStatus>(), Ok(ExitStatus::Approved));
        let err = "ARCHIVED".parse::<ExitStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown exit status `ARCHIVED`");
    }

    #[test]
    fn default_status_is_initiated() {
        assert_eq!(ExitStatus::default(), ExitStatus::Initiated);
    }

    #[test]
    fn status_serializes_as_upper_case_value() {
        let json = serde_json::to_string(&ExitStatus::Withdrawn).unwrap();
        assert_eq!(json, "\"WITHDRAWN\"");
    }

    #[test]
    fn open_statuses_exclude_terminal_states() {
        let open = ExitStatus::open_statuses();
        assert_eq!(
            open,
            vec![ExitStatus::Initiated, ExitStatus::Pending, ExitStatus::Approved]
        );
    }
}
