//! SeaORM implementation of ResourceRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::debug;

use crate::domain::resource::{Resource, ResourceKind, ResourceRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::resource;

pub struct SeaOrmResourceRepository {
    db: DatabaseConnection,
}

impl SeaOrmResourceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: resource::Model) -> DomainResult<Resource> {
    let kind = ResourceKind::parse(&m.kind).ok_or_else(|| {
        DomainError::Dependency(format!("Resource {} has unknown kind '{}'", m.id, m.kind))
    })?;
    Ok(Resource {
        id: m.id,
        kind,
        name: m.name,
        x: m.x,
        y: m.y,
        created_at: m.created_at,
    })
}

#[async_trait]
impl ResourceRepository for SeaOrmResourceRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>> {
        resource::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Resource>> {
        resource::Entity::find()
            .order_by_asc(resource::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }

    async fn create(&self, r: Resource) -> DomainResult<()> {
        if resource::Entity::find_by_id(r.id.clone())
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Resource '{}' already exists",
                r.id
            )));
        }

        debug!(id = %r.id, kind = %r.kind, "Saving resource");
        let model = resource::ActiveModel {
            id: Set(r.id),
            kind: Set(r.kind.as_str().to_string()),
            name: Set(r.name),
            x: Set(r.x),
            y: Set(r.y),
            created_at: Set(r.created_at),
        };
        model.insert(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = resource::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Resource", "id", id));
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(resource::Entity::find().count(&self.db).await?)
    }
}
