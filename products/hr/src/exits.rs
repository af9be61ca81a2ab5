use std::fmt;

use chrono::{NaiveDate, Utc};
use entity::{ExitStatus, audit_now, employee_exits, employees};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{info, instrument};

use crate::dto::{ExitDetails, ExitFilter, NewExit};
use crate::error::{HrError, HrResult, is_unique_violation};
use crate::validate;

const REASON_MAX: usize = 2000;
const NOTES_MAX: usize = 4000;

/// A workflow step that moves an exit from one status to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExitAction {
    Submit,
    Approve,
    Reject,
    Withdraw,
    Complete,
}

impl ExitAction {
    pub const ALL: [ExitAction; 5] = [
        ExitAction::Submit,
        ExitAction::Approve,
        ExitAction::Reject,
        ExitAction::Withdraw,
        ExitAction::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExitAction::Submit => "submit",
            ExitAction::Approve => "approve",
            ExitAction::Reject => "reject",
            ExitAction::Withdraw => "withdraw",
            ExitAction::Complete => "complete",
        }
    }

    pub fn target(self) -> ExitStatus {
        match self {
            ExitAction::Submit => ExitStatus::Pending,
            ExitAction::Approve => ExitStatus::Approved,
            ExitAction::Reject => ExitStatus::Rejected,
            ExitAction::Withdraw => ExitStatus::Withdrawn,
            ExitAction::Complete => ExitStatus::Completed,
        }
    }

    /// Statuses the action may start from. Kept in step with the
    /// `can_be_*` guards on the model.
    pub fn allowed_from(self) -> &'static [ExitStatus] {
        match self {
            ExitAction::Submit => &[ExitStatus::Initiated],
            ExitAction::Approve | ExitAction::Reject | ExitAction::Withdraw => {
                &[ExitStatus::Initiated, ExitStatus::Pending]
            }
            ExitAction::Complete => &[ExitStatus::Approved],
        }
    }

    pub fn permits(self, exit: &employee_exits::Model) -> bool {
        match self {
            ExitAction::Submit => exit.can_be_submitted(),
            ExitAction::Approve => exit.can_be_approved(),
            ExitAction::Reject => exit.can_be_rejected(),
            ExitAction::Withdraw => exit.can_be_withdrawn(),
            ExitAction::Complete => exit.can_be_completed(),
        }
    }
}

impl fmt::Display for ExitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offboarding workflow over any sea-orm connection or transaction.
pub struct ExitService<'a, C> {
    db: &'a C,
}

impl<'a, C> ExitService<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(exit_id = id))]
    pub async fn get(&self, id: i64) -> HrResult<employee_exits::Model> {
        employee_exits::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(HrError::ExitNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ExitFilter) -> HrResult<Vec<employee_exits::Model>> {
        let mut query = employee_exits::Entity::find();
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(employee_exits::Column::EmployeeId.eq(employee_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(employee_exits::Column::Status.eq(status));
        }
        let exits = query
            .order_by_desc(employee_exits::Column::CreatedAt)
            .order_by_desc(employee_exits::Column::Id)
            .all(self.db)
            .await?;
        Ok(exits)
    }

    #[instrument(skip(self, input), fields(employee_id = input.employee_id))]
    pub async fn initiate(&self, input: NewExit) -> HrResult<employee_exits::Model> {
        let employee = employees::Entity::find_by_id(input.employee_id)
            .one(self.db)
            .await?
            .ok_or(HrError::EmployeeNotFound(input.employee_id))?;
        if !employee.is_active {
            return Err(HrError::validation(format!(
                "employee {} is no longer active",
                employee.id
            )));
        }
        check_dates(input.resignation_date, input.last_working_day)?;

        if let Some(open) = self.open_exit(employee.id).await? {
            return Err(HrError::OpenExitExists {
                employee_id: employee.id,
                exit_id: open.id,
            });
        }

        let mut active = employee_exits::ActiveModel::new();
        active.employee_id = Set(employee.id);
        active.resignation_date = Set(input.resignation_date);
        active.last_working_day = Set(input.last_working_day);
        active.exit_reason = Set(validate::optional(
            "exitReason",
            input.exit_reason,
            REASON_MAX,
        )?);
        active.notes = Set(validate::optional("notes", input.notes, NOTES_MAX)?);
        let exit = match active.insert(self.db).await {
            Ok(exit) => exit,
            // Lost a race against another initiate; the partial unique index
            // on open exits rejected this row.
            Err(err) if is_unique_violation(&err) => {
                return match self.open_exit(employee.id).await? {
                    Some(open) => Err(HrError::OpenExitExists {
                        employee_id: employee.id,
                        exit_id: open.id,
                    }),
                    None => Err(err.into()),
                };
            }
            Err(err) => return Err(err.into()),
        };
        info!(exit_id = exit.id, "exit initiated");
        Ok(exit)
    }

    /// Edits dates and free text while the exit is still open.
    #[instrument(skip(self, details), fields(exit_id = id))]
    pub async fn update_details(
        &self,
        id: i64,
        details: ExitDetails,
    ) -> HrResult<employee_exits::Model> {
        let exit = self.get(id).await?;
        ensure_open(&exit)?;
        let resignation_date = details.resignation_date.or(exit.resignation_date);
        let last_working_day = details.last_working_day.or(exit.last_working_day);
        check_dates(resignation_date, last_working_day)?;

        let mut update = employee_exits::Entity::update_many()
            .col_expr(employee_exits::Column::ResignationDate, Expr::value(resignation_date))
            .col_expr(employee_exits::Column::LastWorkingDay, Expr::value(last_working_day))
            .col_expr(employee_exits::Column::UpdatedAt, Expr::value(audit_now()));
        if details.exit_reason.is_some() {
            let reason = validate::optional("exitReason", details.exit_reason, REASON_MAX)?;
            update = update.col_expr(employee_exits::Column::ExitReason, Expr::value(reason));
        }
        if details.notes.is_some() {
            let notes = validate::optional("notes", details.notes, NOTES_MAX)?;
            update = update.col_expr(employee_exits::Column::Notes, Expr::value(notes));
        }
        let result = update
            .filter(employee_exits::Column::Id.eq(id))
            .filter(employee_exits::Column::Status.is_in(ExitStatus::open_statuses()))
            .exec(self.db)
            .await?;
        let updated = self.get(id).await?;
        if result.rows_affected == 0 {
            ensure_open(&updated)?;
        }
        Ok(updated)
    }

    #[instrument(skip(self), fields(exit_id = id))]
    pub async fn submit(&self, id: i64) -> HrResult<employee_exits::Model> {
        self.transition(self.db, id, ExitAction::Submit, Vec::new())
            .await?;
        self.get(id).await
    }

    #[instrument(skip(self), fields(exit_id = id))]
    pub async fn approve(
        &self,
        id: i64,
        approver_id: i64,
        approval_date: Option<NaiveDate>,
    ) -> HrResult<employee_exits::Model> {
        let exit = self.get(id).await?;
        ensure_permitted(&exit, ExitAction::Approve)?;
        let approver = self.reviewer(&exit, approver_id).await?;
        let approval_date = approval_date.unwrap_or_else(|| Utc::now().date_naive());
        if let Some(resigned) = exit.resignation_date {
            if approval_date < resigned {
                return Err(HrError::validation(
                    "approvalDate cannot precede the resignation date",
                ));
            }
        }
        self.transition(
            self.db,
            id,
            ExitAction::Approve,
            vec![
                (employee_exits::Column::ApprovedBy, Expr::value(Some(approver.id))),
                (employee_exits::Column::ApprovalDate, Expr::value(Some(approval_date))),
            ],
        )
        .await?;
        info!(approver_id, "exit approved");
        self.get(id).await
    }

    #[instrument(skip(self, note), fields(exit_id = id))]
    pub async fn reject(
        &self,
        id: i64,
        approver_id: i64,
        note: Option<String>,
    ) -> HrResult<employee_exits::Model> {
        let exit = self.get(id).await?;
        ensure_permitted(&exit, ExitAction::Reject)?;
        let reviewer = self.reviewer(&exit, approver_id).await?;
        let notes = match validate::optional("note", note, NOTES_MAX)? {
            Some(note) => append_note(exit.notes.as_deref(), &note),
            None => exit.notes.clone(),
        };
        if let Some(notes) = notes.as_deref() {
            if notes.chars().count() > NOTES_MAX {
                return Err(HrError::validation(format!(
                    "notes must be at most {NOTES_MAX} characters"
                )));
            }
        }
        self.transition(
            self.db,
            id,
            ExitAction::Reject,
            vec![
                (employee_exits::Column::ApprovedBy, Expr::value(Some(reviewer.id))),
                (employee_exits::Column::Notes, Expr::value(notes)),
            ],
        )
        .await?;
        self.get(id).await
    }

    #[instrument(skip(self), fields(exit_id = id))]
    pub async fn withdraw(&self, id: i64) -> HrResult<employee_exits::Model> {
        self.transition(self.db, id, ExitAction::Withdraw, Vec::new())
            .await?;
        self.get(id).await
    }

    /// Closes an approved exit and deactivates the employee atomically.
    #[instrument(skip(self), fields(exit_id = id))]
    pub async fn complete(&self, id: i64) -> HrResult<employee_exits::Model> {
        let txn = self.db.begin().await?;
        self.transition(&txn, id, ExitAction::Complete, Vec::new())
            .await?;
        let exit = employee_exits::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(HrError::ExitNotFound(id))?;
        let employee = employees::Entity::find_by_id(exit.employee_id)
            .one(&txn)
            .await?
            .ok_or(HrError::EmployeeNotFound(exit.employee_id))?;
        if employee.is_active {
            let mut active: employees::ActiveModel = employee.into();
            active.is_active = Set(false);
            active.update(&txn).await?;
        }
        txn.commit().await?;
        info!(employee_id = exit.employee_id, "exit completed");
        Ok(exit)
    }

    async fn open_exit(&self, employee_id: i64) -> HrResult<Option<employee_exits::Model>> {
        let open = employee_exits::Entity::find()
            .filter(employee_exits::Column::EmployeeId.eq(employee_id))
            .filter(employee_exits::Column::Status.is_in(ExitStatus::open_statuses()))
            .one(self.db)
            .await?;
        Ok(open)
    }

    async fn reviewer(
        &self,
        exit: &employee_exits::Model,
        reviewer_id: i64,
    ) -> HrResult<employees::Model> {
        if reviewer_id == exit.employee_id {
            return Err(HrError::validation(
                "an employee cannot review their own exit",
            ));
        }
        employees::Entity::find_by_id(reviewer_id)
            .one(self.db)
            .await?
            .ok_or(HrError::EmployeeNotFound(reviewer_id))
    }

    /// Applies `action` with `UPDATE .. WHERE id = ? AND status IN (..)` so a
    /// concurrent writer cannot slip an out-of-order step in between.
    async fn transition<T>(
        &self,
        conn: &T,
        id: i64,
        action: ExitAction,
        extra: Vec<(employee_exits::Column, sea_orm::sea_query::SimpleExpr)>,
    ) -> HrResult<()>
    where
        T: ConnectionTrait,
    {
        let mut update = employee_exits::Entity::update_many()
            .col_expr(employee_exits::Column::Status, Expr::value(action.target()))
            .col_expr(employee_exits::Column::UpdatedAt, Expr::value(audit_now()));
        for (column, value) in extra {
            update = update.col_expr(column, value);
        }
        let result = update
            .filter(employee_exits::Column::Id.eq(id))
            .filter(employee_exits::Column::Status.is_in(action.allowed_from().iter().copied()))
            .exec(conn)
            .await?;
        if result.rows_affected > 0 {
            info!(action = action.as_str(), to = %action.target(), "exit transitioned");
            return Ok(());
        }
        let current = employee_exits::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or(HrError::ExitNotFound(id))?;
        Err(HrError::InvalidTransition {
            exit_id: id,
            from: current.status,
            action,
        })
    }
}

fn ensure_permitted(exit: &employee_exits::Model, action: ExitAction) -> HrResult<()> {
    if action.permits(exit) {
        Ok(())
    } else {
        Err(HrError::InvalidTransition {
            exit_id: exit.id,
            from: exit.status,
            action,
        })
    }
}

fn ensure_open(exit: &employee_exits::Model) -> HrResult<()> {
    if exit.status.is_open() {
        Ok(())
    } else {
        Err(HrError::ExitClosed {
            exit_id: exit.id,
            status: exit.status,
        })
    }
}

fn check_dates(resignation: Option<NaiveDate>, last_day: Option<NaiveDate>) -> HrResult<()> {
    match (resignation, last_day) {
        (Some(resigned), Some(last)) if last < resigned => Err(HrError::validation(
            "lastWorkingDay cannot precede resignationDate",
        )),
        _ => Ok(()),
    }
}

fn append_note(existing: Option<&str>, note: &str) -> Option<String> {
    match existing {
        Some(existing) if !existing.is_empty() => Some(format!("{existing}\n{note}")),
        _ => Some(note.to_string()),
    }
}
