//! Per-key async exclusion for read-compute-write sequences.
//!
//! Services take a guard for the entity they are about to recompute
//! (a capital call, an allocation, or a whole fund) and hold it until the
//! write lands. Keys are namespaced so the same id in two entity types never
//! shares a lock. Callers acquire in the order call -> allocation -> fund and
//! never re-enter a key they already hold.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

#[derive(Default)]
pub struct KeyedMutex {
    locks: LockMap,
}

/// Exclusive access to one key. Dropping it releases the key and removes the
/// map entry once no other task holds or waits on it.
pub struct KeyedGuard<'a> {
    locks: &'a LockMap,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        // Release first so the guard's own reference no longer counts.
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyedGuard<'_> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        KeyedGuard {
            locks: &self.locks,
            key: key.to_string(),
            guard: Some(mutex.lock_owned().await),
        }
    }

    pub async fn lock_capital_call(&self, capital_call_id: &str) -> KeyedGuard<'_> {
        self.lock(&format!("capital_call:{}", capital_call_id)).await
    }

    pub async fn lock_allocation(&self, allocation_id: &str) -> KeyedGuard<'_> {
        self.lock(&format!("allocation:{}", allocation_id)).await
    }

    pub async fn lock_fund(&self, fund_id: &str) -> KeyedGuard<'_> {
        self.lock(&format!("fund:{}", fund_id)).await
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
