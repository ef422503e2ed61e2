use async_trait::async_trait;

use super::model::Resource;
use crate::domain::DomainResult;

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Resource>>;

    async fn find_all(&self) -> DomainResult<Vec<Resource>>;

    /// Insert a new resource. Fails with `Conflict` if the id is taken.
    async fn create(&self, resource: Resource) -> DomainResult<()>;

    /// Fails with `NotFound` if no resource has this id.
    async fn delete(&self, id: &str) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
