//! Persistence entities for the HRMS schema.

pub mod employee_exits;
pub mod employees;
pub mod permissions;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;

pub use employee_exits::ExitStatus;

/// Instant used by the save hooks for `created_at` / `updated_at`.
pub fn audit_now() -> DateTimeWithTimeZone {
    Utc::now().into()
}
