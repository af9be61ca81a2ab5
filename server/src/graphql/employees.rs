use async_graphql::{Context, ID, InputObject, Object, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use entity::employees;
use products_hr::{EmployeeService, HrError, dto::NewEmployee};
use tracing::instrument;

use super::{database, hr_error, parse_id, to_id};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Employee")]
pub struct EmployeeNode {
    pub id: ID,
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

impl From<employees::Model> for EmployeeNode {
    fn from(model: employees::Model) -> Self {
        Self {
            id: to_id(model.id),
            full_name: model.full_name(),
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

#[derive(InputObject, Debug)]
pub struct CreateEmployeeInput {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

impl From<CreateEmployeeInput> for NewEmployee {
    fn from(input: CreateEmployeeInput) -> Self {
        Self {
            employee_code: input.employee_code,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            department: input.department,
            job_title: input.job_title,
            hire_date: input.hire_date,
        }
    }
}

#[derive(Default)]
pub struct EmployeeQuery;

#[Object]
impl EmployeeQuery {
    #[instrument(name = "graphql.employees.list", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = false)] active_only: bool,
    ) -> async_graphql::Result<Vec<EmployeeNode>> {
        let db = database(ctx)?;
        let rows = EmployeeService::new(db)
            .list(active_only)
            .await
            .map_err(hr_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(name = "graphql.employees.get", skip_all)]
    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        let db = database(ctx)?;
        match EmployeeService::new(db).get(parse_id(&id)?).await {
            Ok(employee) => Ok(Some(employee.into())),
            Err(HrError::EmployeeNotFound(_)) => Ok(None),
            Err(err) => Err(hr_error(err)),
        }
    }
}

#[derive(Default)]
pub struct EmployeeMutation;

#[Object]
impl EmployeeMutation {
    #[instrument(name = "graphql.employees.create", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        input: CreateEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        let db = database(ctx)?;
        let employee = EmployeeService::new(db)
            .create(input.into())
            .await
            .map_err(hr_error)?;
        Ok(employee.into())
    }
}
