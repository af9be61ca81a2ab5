//! HR vertical slice: employee records, the offboarding (exit) workflow and
//! the permission catalogue.

pub mod dto;
pub mod employees;
pub mod error;
pub mod exits;
pub mod permissions;
pub mod seed;

mod validate;

pub use employees::EmployeeService;
pub use error::{HrError, HrResult};
pub use exits::{ExitAction, ExitService};
pub use permissions::PermissionService;
