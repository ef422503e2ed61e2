//! Catalog service: list and administer bookable resources

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::reservations::access;
use crate::domain::{
    CallerIdentity, DomainError, DomainResult, RepositoryProvider, Resource, ResourceKind,
};

/// Input for [`CatalogService::create`].
#[derive(Debug, Clone)]
pub struct NewResource {
    pub id: String,
    pub kind: ResourceKind,
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

/// Service for resource catalog operations
pub struct CatalogService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CatalogService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self) -> DomainResult<Vec<Resource>> {
        self.repos.resources().find_all().await
    }

    pub async fn get(&self, id: &str) -> DomainResult<Resource> {
        self.repos
            .resources()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Resource", "id", id))
    }

    pub async fn create(&self, caller: &CallerIdentity, new: NewResource) -> DomainResult<Resource> {
        ensure_admin(caller)?;
        let resource = Resource {
            id: new.id,
            kind: new.kind,
            name: new.name,
            x: new.x,
            y: new.y,
            created_at: Utc::now(),
        };
        self.repos.resources().create(resource.clone()).await?;
        info!(id = %resource.id, kind = %resource.kind, by = %caller.user_id, "Resource created");
        Ok(resource)
    }

    /// Remove a resource. Existing reservations on it are left untouched.
    pub async fn delete(&self, caller: &CallerIdentity, id: &str) -> DomainResult<()> {
        ensure_admin(caller)?;
        self.repos.resources().delete(id).await?;
        info!(id, by = %caller.user_id, "Resource deleted");
        Ok(())
    }
}

fn ensure_admin(caller: &CallerIdentity) -> DomainResult<()> {
    if access::can_manage_catalog(caller) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(
            "Admin role required to manage resources".into(),
        ))
    }
}
