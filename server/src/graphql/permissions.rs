use async_graphql::{Context, ID, InputObject, Object, SimpleObject};
use chrono::{DateTime, Utc};
use products_hr::{
    PermissionService,
    dto::{NewPermission, PermissionResponse},
};
use tracing::instrument;

use super::{database, hr_error, parse_id, to_id};

/// GraphQL view of [`PermissionResponse`]; keeps the `isSystemPermission` name.
#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Permission")]
pub struct PermissionNode {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    #[graphql(name = "isSystemPermission")]
    pub system_permission: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PermissionResponse> for PermissionNode {
    fn from(value: PermissionResponse) -> Self {
        Self {
            id: to_id(value.id),
            name: value.name,
            description: value.description,
            resource: value.resource,
            action: value.action,
            system_permission: value.system_permission,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreatePermissionInput {
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    #[graphql(name = "isSystemPermission", default = false)]
    pub system_permission: bool,
}

#[derive(Default)]
pub struct PermissionQuery;

#[Object]
impl PermissionQuery {
    #[instrument(name = "graphql.permissions.list", skip_all)]
    async fn permissions(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<PermissionNode>> {
        let db = database(ctx)?;
        let rows = PermissionService::new(db).list().await.map_err(hr_error)?;
        Ok(rows
            .into_iter()
            .map(|row| PermissionResponse::from(row).into())
            .collect())
    }
}

#[derive(Default)]
pub struct PermissionMutation;

#[Object]
impl PermissionMutation {
    #[instrument(name = "graphql.permissions.create", skip_all)]
    async fn create_permission(
        &self,
        ctx: &Context<'_>,
        input: CreatePermissionInput,
    ) -> async_graphql::Result<PermissionNode> {
        let db = database(ctx)?;
        let created = PermissionService::new(db)
            .create(NewPermission {
                name: input.name,
                description: input.description,
                resource: input.resource,
                action: input.action,
                system_permission: input.system_permission,
            })
            .await
            .map_err(hr_error)?;
        Ok(PermissionResponse::from(created).into())
    }

    #[instrument(name = "graphql.permissions.delete", skip_all)]
    async fn delete_permission(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let db = database(ctx)?;
        PermissionService::new(db)
            .delete(parse_id(&id)?)
            .await
            .map_err(hr_error)?;
        Ok(true)
    }
}
