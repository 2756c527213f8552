use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::domain::WorkshopId;

/// One mutex per workshop. Operations on different workshops never contend.
#[derive(Debug, Default)]
pub struct WorkshopLocks {
    locks: Mutex<HashMap<WorkshopId, Arc<Mutex<()>>>>,
}

impl WorkshopLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` while holding the workshop's lock.
    ///
    /// A poisoned lock is recovered: the guarded data lives in the repositories, and every store
    /// operation writes whole records, so a panic mid-operation leaves nothing half applied.
    pub fn with_workshop<T>(&self, workshop_id: &WorkshopId, operation: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(workshop_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        operation()
    }

    fn lock_for(&self, workshop_id: &WorkshopId) -> Arc<Mutex<()>> {
        let mut registry = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .entry(workshop_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn serializes_operations_for_the_same_workshop() {
        let locks = WorkshopLocks::new();
        let workshop = WorkshopId::new("taller-norte");
        let inside = AtomicUsize::new(0);
        let max_seen = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    locks.with_workshop(&workshop, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        std::thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hands_out_distinct_locks_per_workshop() {
        let locks = WorkshopLocks::new();
        let north = locks.lock_for(&WorkshopId::new("north"));
        let south = locks.lock_for(&WorkshopId::new("south"));
        assert!(!Arc::ptr_eq(&north, &south));
        assert!(Arc::ptr_eq(&north, &locks.lock_for(&WorkshopId::new("north"))));
    }
}
