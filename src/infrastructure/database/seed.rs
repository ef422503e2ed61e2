//! Default catalog seeding

use tracing::info;

use crate::domain::resource::{default_catalog, ResourceRepository};
use crate::domain::DomainResult;

/// Insert the campus parking layout if the catalog is empty.
///
/// Returns the number of resources inserted.
pub async fn seed_default_catalog(repo: &dyn ResourceRepository) -> DomainResult<usize> {
    if repo.count().await? > 0 {
        return Ok(0);
    }

    let catalog = default_catalog();
    let inserted = catalog.len();
    for resource in catalog {
        repo.create(resource).await?;
    }
    info!(inserted, "Seeded default resource catalog");
    Ok(inserted)
}
