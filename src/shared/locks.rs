//! Per-resource single-writer sections

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle entries are swept once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Lock table keyed by resource id.
///
/// Writers on the same resource queue behind one async mutex; writers on
/// different resources never contend.
#[derive(Default)]
pub struct ResourceLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `resource_id`. Released on drop.
    pub async fn acquire(&self, resource_id: &str) -> OwnedMutexGuard<()> {
        if self.locks.len() > PRUNE_THRESHOLD {
            self.prune();
        }
        // Clone the Arc out so the shard lock is not held across the await.
        let lock = self
            .locks
            .entry(resource_id.to_string())
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Drop entries nobody holds or waits on.
    fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_resource_is_exclusive() {
        let locks = ResourceLocks::new();
        let guard = locks.acquire("A1").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("A1")).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire("A1")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_resources_do_not_contend() {
        let locks = ResourceLocks::new();
        let _a1 = locks.acquire("A1").await;
        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire("A2")).await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = ResourceLocks::new();
        let held = locks.acquire("A1").await;
        drop(locks.acquire("A2").await);

        locks.prune();
        assert_eq!(locks.locks.len(), 1);

        drop(held);
        locks.prune();
        assert!(locks.locks.is_empty());
    }
}
