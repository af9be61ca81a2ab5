use entity::ExitStatus;
use platform_api::ApiError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::exits::ExitAction;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("employee {0} not found")]
    EmployeeNotFound(i64),
    #[error("employee exit {0} not found")]
    ExitNotFound(i64),
    #[error("permission {0} not found")]
    PermissionNotFound(i64),
    #[error("cannot {action} exit {exit_id} while it is {from}")]
    InvalidTransition {
        exit_id: i64,
        from: ExitStatus,
        action: ExitAction,
    },
    #[error("exit {exit_id} is {status} and can no longer be edited")]
    ExitClosed { exit_id: i64, status: ExitStatus },
    #[error("employee {employee_id} already has open exit {exit_id}")]
    OpenExitExists { employee_id: i64, exit_id: i64 },
    #[error("{0}")]
    Validation(String),
    #[error("permission `{0}` already exists")]
    DuplicatePermission(String),
    #[error("employee `{0}` already exists")]
    DuplicateEmployee(String),
    #[error("permission {0} is a system permission")]
    SystemPermission(i64),
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl HrError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// True when the database refused a write because of a unique constraint.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::EmployeeNotFound(id) => ApiError::not_found(format!("employee {id}")),
            HrError::ExitNotFound(id) => ApiError::not_found(format!("employee exit {id}")),
            HrError::PermissionNotFound(id) => ApiError::not_found(format!("permission {id}")),
            HrError::Validation(message) => ApiError::InvalidInput(message),
            HrError::InvalidTransition { .. }
            | HrError::ExitClosed { .. }
            | HrError::OpenExitExists { .. }
            | HrError::DuplicatePermission(_)
            | HrError::DuplicateEmployee(_)
            | HrError::SystemPermission(_) => ApiError::Conflict(value.to_string()),
            HrError::Db(err) => ApiError::internal(err.into()),
        }
    }
}
