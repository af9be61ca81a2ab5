//! Request and response shapes shared by the REST and GraphQL surfaces.

use chrono::{DateTime, NaiveDate, Utc};
use entity::{ExitStatus, employee_exits, employees, permissions};
use serde::{Deserialize, Serialize};

/// Read model of a permission record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    #[serde(rename = "isSystemPermission")]
    pub system_permission: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<permissions::Model> for PermissionResponse {
    fn from(model: permissions::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            resource: model.resource,
            action: model.action,
            system_permission: model.is_system_permission,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeExitResponse {
    pub id: i64,
    pub employee_id: i64,
    pub approved_by: Option<i64>,
    pub resignation_date: Option<NaiveDate>,
    pub last_working_day: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    pub notes: Option<String>,
    pub status: ExitStatus,
    pub can_be_approved: bool,
    pub can_be_withdrawn: bool,
    pub can_be_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employee_exits::Model> for EmployeeExitResponse {
    fn from(model: employee_exits::Model) -> Self {
        Self {
            can_be_approved: model.can_be_approved(),
            can_be_withdrawn: model.can_be_withdrawn(),
            can_be_completed: model.can_be_completed(),
            id: model.id,
            employee_id: model.employee_id,
            approved_by: model.approved_by,
            resignation_date: model.resignation_date,
            last_working_day: model.last_working_day,
            approval_date: model.approval_date,
            exit_reason: model.exit_reason,
            notes: model.notes,
            status: model.status,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employees::Model> for EmployeeResponse {
    fn from(model: employees::Model) -> Self {
        Self {
            full_name: model.full_name(),
            id: model.id,
            employee_code: model.employee_code,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            department: model.department,
            job_title: model.job_title,
            hire_date: model.hire_date,
            is_active: model.is_active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExit {
    pub employee_id: i64,
    #[serde(default)]
    pub resignation_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_working_day: Option<NaiveDate>,
    #[serde(default)]
    pub exit_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Editable fields of an open exit. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitDetails {
    #[serde(default)]
    pub resignation_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_working_day: Option<NaiveDate>,
    #[serde(default)]
    pub exit_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitFilter {
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub status: Option<ExitStatus>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPermission {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    #[serde(default, rename = "isSystemPermission")]
    pub system_permission: bool,
}
