use entity::employees;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::dto::NewEmployee;
use crate::error::{HrError, HrResult, is_unique_violation};
use crate::validate;

pub struct EmployeeService<'a, C> {
    db: &'a C,
}

impl<'a, C> EmployeeService<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(employee_id = id))]
    pub async fn get(&self, id: i64) -> HrResult<employees::Model> {
        employees::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(HrError::EmployeeNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, active_only: bool) -> HrResult<Vec<employees::Model>> {
        let mut query = employees::Entity::find();
        if active_only {
            query = query.filter(employees::Column::IsActive.eq(true));
        }
        let rows = query
            .order_by_asc(employees::Column::LastName)
            .order_by_asc(employees::Column::FirstName)
            .order_by_asc(employees::Column::Id)
            .all(self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self, input), fields(code = %input.employee_code))]
    pub async fn create(&self, input: NewEmployee) -> HrResult<employees::Model> {
        let code = validate::required("employeeCode", &input.employee_code, 32)?;
        let first_name = validate::required("firstName", &input.first_name, 100)?;
        let last_name = validate::required("lastName", &input.last_name, 100)?;
        let email = validate::required("email", &input.email, 255)?.to_lowercase();
        if !email.contains('@') {
            return Err(HrError::validation("email must contain '@'"));
        }

        if let Some(label) = self.clash(&code, &email).await? {
            return Err(HrError::DuplicateEmployee(label));
        }

        let mut active = employees::ActiveModel::new();
        active.employee_code = Set(code.clone());
        active.first_name = Set(first_name);
        active.last_name = Set(last_name);
        active.email = Set(email.clone());
        active.department = Set(validate::optional("department", input.department, 100)?);
        active.job_title = Set(validate::optional("jobTitle", input.job_title, 100)?);
        active.hire_date = Set(input.hire_date);
        let created = match active.insert(self.db).await {
            Ok(created) => created,
            Err(err) if is_unique_violation(&err) => {
                let label = self.clash(&code, &email).await?.unwrap_or(code);
                return Err(HrError::DuplicateEmployee(label));
            }
            Err(err) => return Err(err.into()),
        };
        info!(employee_id = created.id, "employee created");
        Ok(created)
    }

    async fn clash(&self, code: &str, email: &str) -> HrResult<Option<String>> {
        let existing = employees::Entity::find()
            .filter(
                Condition::any()
                    .add(employees::Column::EmployeeCode.eq(code))
                    .add(employees::Column::Email.eq(email)),
            )
            .one(self.db)
            .await?;
        Ok(existing.map(|existing| {
            if existing.employee_code == code {
                existing.employee_code
            } else {
                existing.email
            }
        }))
    }
}
