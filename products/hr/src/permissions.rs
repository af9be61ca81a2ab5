use entity::permissions;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, instrument};

use crate::dto::NewPermission;
use crate::error::{HrError, HrResult, is_unique_violation};
use crate::validate;

const NAME_MAX: usize = 100;
const PART_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;

pub struct PermissionService<'a, C> {
    db: &'a C,
}

impl<'a, C> PermissionService<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> HrResult<Vec<permissions::Model>> {
        let rows = permissions::Entity::find()
            .order_by_asc(permissions::Column::Resource)
            .order_by_asc(permissions::Column::Action)
            .order_by_asc(permissions::Column::Name)
            .all(self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(permission_id = id))]
    pub async fn get(&self, id: i64) -> HrResult<permissions::Model> {
        permissions::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(HrError::PermissionNotFound(id))
    }

    pub async fn find_by_name(&self, name: &str) -> HrResult<Option<permissions::Model>> {
        let found = permissions::Entity::find()
            .filter(permissions::Column::Name.eq(name.trim()))
            .one(self.db)
            .await?;
        Ok(found)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewPermission) -> HrResult<permissions::Model> {
        let name = validate::required("name", &input.name, NAME_MAX)?;
        let resource = validate::required("resource", &input.resource, PART_MAX)?;
        let action = validate::required("action", &input.action, PART_MAX)?;
        let description = validate::optional("description", input.description, DESCRIPTION_MAX)?;

        if let Some(label) = self.clash(&name, &resource, &action).await? {
            return Err(HrError::DuplicatePermission(label));
        }

        let mut active = permissions::ActiveModel::new();
        active.name = Set(name.clone());
        active.description = Set(description);
        active.resource = Set(resource.clone());
        active.action = Set(action.clone());
        active.is_system_permission = Set(input.system_permission);
        let created = match active.insert(self.db).await {
            Ok(created) => created,
            Err(err) if is_unique_violation(&err) => {
                let label = self
                    .clash(&name, &resource, &action)
                    .await?
                    .unwrap_or_else(|| format!("{resource}:{action}"));
                return Err(HrError::DuplicatePermission(label));
            }
            Err(err) => return Err(err.into()),
        };
        info!(permission_id = created.id, "permission created");
        Ok(created)
    }

    /// Label of an existing permission sharing the name or the
    /// resource/action pair.
    async fn clash(&self, name: &str, resource: &str, action: &str) -> HrResult<Option<String>> {
        let existing = permissions::Entity::find()
            .filter(
                Condition::any()
                    .add(permissions::Column::Name.eq(name))
                    .add(
                        Condition::all()
                            .add(permissions::Column::Resource.eq(resource))
                            .add(permissions::Column::Action.eq(action)),
                    ),
            )
            .one(self.db)
            .await?;
        Ok(existing.map(|existing| {
            if existing.name == name {
                existing.name
            } else {
                format!("{resource}:{action}")
            }
        }))
    }

    #[instrument(skip(self), fields(permission_id = id))]
    pub async fn delete(&self, id: i64) -> HrResult<()> {
        let permission = self.get(id).await?;
        if permission.is_system_permission {
            return Err(HrError::SystemPermission(id));
        }
        permission.delete(self.db).await?;
        info!("permission deleted");
        Ok(())
    }
}
