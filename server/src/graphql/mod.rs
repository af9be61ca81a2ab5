mod employees;
mod exits;
mod permissions;

use async_graphql::{
    Context, EmptySubscription, Error, ErrorExtensions, ID, MergedObject, Object, Schema,
    SimpleObject,
};
use platform_api::ApiError;
use platform_db::DbPool;
use products_hr::HrError;
use serde::Serialize;
use tracing::instrument;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(pool: DbPool) -> SchemaType {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(pool)
        .finish()
}

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    SystemQuery,
    employees::EmployeeQuery,
    exits::ExitQuery,
    permissions::PermissionQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    employees::EmployeeMutation,
    exits::ExitMutation,
    permissions::PermissionMutation,
);

#[derive(Default)]
pub struct SystemQuery;

#[Object]
impl SystemQuery {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthPayload> {
        let db_ok = platform_db::check(database(ctx)?).await.is_ok();
        Ok(HealthPayload { ok: db_ok, db_ok })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
    pub db_ok: bool,
}

fn database<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a DbPool> {
    ctx.data::<DbPool>()
}

fn hr_error(err: HrError) -> Error {
    ApiError::from(err).extend()
}

fn parse_id(id: &ID) -> async_graphql::Result<i64> {
    id.parse::<i64>()
        .map_err(|_| ApiError::invalid(format!("`{}` is not a valid id", id.as_str())).extend())
}

fn to_id(id: i64) -> ID {
    ID(id.to_string())
}
