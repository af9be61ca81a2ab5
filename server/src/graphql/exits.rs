use async_graphql::{ComplexObject, Context, Enum, ID, InputObject, Object, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{ExitStatus, employee_exits};
use products_hr::{
    EmployeeService, ExitService,
    dto::{ExitDetails, ExitFilter, NewExit},
};
use tracing::instrument;

use super::{database, employees::EmployeeNode, hr_error, parse_id, to_id};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
#[graphql(name = "ExitStatus")]
pub enum ExitStatusGql {
    Initiated,
    Pending,
    Approved,
    Rejected,
    Withdrawn,
    Completed,
}

impl From<ExitStatus> for ExitStatusGql {
    fn from(value: ExitStatus) -> Self {
        match value {
            ExitStatus::Initiated => ExitStatusGql::Initiated,
            ExitStatus::Pending => ExitStatusGql::Pending,
            ExitStatus::Approved => ExitStatusGql::Approved,
            ExitStatus::Rejected => ExitStatusGql::Rejected,
            ExitStatus::Withdrawn => ExitStatusGql::Withdrawn,
            ExitStatus::Completed => ExitStatusGql::Completed,
        }
    }
}

impl From<ExitStatusGql> for ExitStatus {
    fn from(value: ExitStatusGql) -> Self {
        match value {
            ExitStatusGql::Initiated => ExitStatus::Initiated,
            ExitStatusGql::Pending => ExitStatus::Pending,
            ExitStatusGql::Approved => ExitStatus::Approved,
            ExitStatusGql::Rejected => ExitStatus::Rejected,
            ExitStatusGql::Withdrawn => ExitStatus::Withdrawn,
            ExitStatusGql::Completed => ExitStatus::Completed,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(complex, name = "EmployeeExit")]
pub struct ExitNode {
    pub id: ID,
    pub employee_id: ID,
    pub approved_by: Option<ID>,
    pub resignation_date: Option<NaiveDate>,
    pub last_working_day: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    pub notes: Option<String>,
    pub status: ExitStatusGql,
    pub can_be_approved: bool,
    pub can_be_withdrawn: bool,
    pub can_be_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    employee_key: i64,
}

impl From<employee_exits::Model> for ExitNode {
    fn from(model: employee_exits::Model) -> Self {
        Self {
            can_be_approved: model.can_be_approved(),
            can_be_withdrawn: model.can_be_withdrawn(),
            can_be_completed: model.can_be_completed(),
            id: to_id(model.id),
            employee_id: to_id(model.employee_id),
            approved_by: model.approved_by.map(to_id),
            resignation_date: model.resignation_date,
            last_working_day: model.last_working_day,
            approval_date: model.approval_date,
            exit_reason: model.exit_reason,
            notes: model.notes,
            status: model.status.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            employee_key: model.employee_id,
        }
    }
}

#[ComplexObject]
impl ExitNode {
    async fn employee(&self, ctx: &Context<'_>) -> async_graphql::Result<EmployeeNode> {
        let db = database(ctx)?;
        let employee = EmployeeService::new(db)
            .get(self.employee_key)
            .await
            .map_err(hr_error)?;
        Ok(employee.into())
    }
}

#[derive(InputObject, Debug)]
pub struct InitiateExitInput {
    pub employee_id: ID,
    pub resignation_date: Option<NaiveDate>,
    pub last_working_day: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(InputObject, Debug)]
pub struct UpdateExitInput {
    pub id: ID,
    pub resignation_date: Option<NaiveDate>,
    pub last_working_day: Option<NaiveDate>,
    pub exit_reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct ExitQuery;

#[Object]
impl ExitQuery {
    #[instrument(name = "graphql.exits.list", skip_all)]
    async fn employee_exits(
        &self,
        ctx: &Context<'_>,
        employee_id: Option<ID>,
        status: Option<ExitStatusGql>,
    ) -> async_graphql::Result<Vec<ExitNode>> {
        let db = database(ctx)?;
        let filter = ExitFilter {
            employee_id: employee_id.as_ref().map(parse_id).transpose()?,
            status: status.map(Into::into),
        };
        let rows = ExitService::new(db).list(filter).await.map_err(hr_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(name = "graphql.exits.get", skip_all)]
    async fn employee_exit(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<ExitNode>> {
        let db = database(ctx)?;
        let id = parse_id(&id)?;
        match ExitService::new(db).get(id).await {
            Ok(exit) => Ok(Some(exit.into())),
            Err(products_hr::HrError::ExitNotFound(_)) => Ok(None),
            Err(err) => Err(hr_error(err)),
        }
    }
}

#[derive(Default)]
pub struct ExitMutation;

#[Object]
impl ExitMutation {
    #[instrument(name = "graphql.exits.initiate", skip_all)]
    async fn initiate_exit(
        &self,
        ctx: &Context<'_>,
        input: InitiateExitInput,
    ) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let new_exit = NewExit {
            employee_id: parse_id(&input.employee_id)?,
            resignation_date: input.resignation_date,
            last_working_day: input.last_working_day,
            exit_reason: input.exit_reason,
            notes: input.notes,
        };
        let exit = ExitService::new(db)
            .initiate(new_exit)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.update", skip_all)]
    async fn update_exit(
        &self,
        ctx: &Context<'_>,
        input: UpdateExitInput,
    ) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let id = parse_id(&input.id)?;
        let details = ExitDetails {
            resignation_date: input.resignation_date,
            last_working_day: input.last_working_day,
            exit_reason: input.exit_reason,
            notes: input.notes,
        };
        let exit = ExitService::new(db)
            .update_details(id, details)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.submit", skip_all)]
    async fn submit_exit(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let exit = ExitService::new(db)
            .submit(parse_id(&id)?)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.approve", skip_all)]
    async fn approve_exit(
        &self,
        ctx: &Context<'_>,
        id: ID,
        approver_id: ID,
        approval_date: Option<NaiveDate>,
    ) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let exit = ExitService::new(db)
            .approve(parse_id(&id)?, parse_id(&approver_id)?, approval_date)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.reject", skip_all)]
    async fn reject_exit(
        &self,
        ctx: &Context<'_>,
        id: ID,
        approver_id: ID,
        note: Option<String>,
    ) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let exit = ExitService::new(db)
            .reject(parse_id(&id)?, parse_id(&approver_id)?, note)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.withdraw", skip_all)]
    async fn withdraw_exit(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let exit = ExitService::new(db)
            .withdraw(parse_id(&id)?)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }

    #[instrument(name = "graphql.exits.complete", skip_all)]
    async fn complete_exit(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<ExitNode> {
        let db = database(ctx)?;
        let exit = ExitService::new(db)
            .complete(parse_id(&id)?)
            .await
            .map_err(hr_error)?;
        Ok(exit.into())
    }
}
