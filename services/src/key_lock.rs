//! Per-key async mutual exclusion.
//!
//! Every read-modify-write on a session or record key runs while holding the
//! guard for that key, so two writers of the same key never interleave.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Idle slots are dropped once the map grows past this many keys.
const PRUNE_THRESHOLD: usize = 256;

pub struct KeyedLocks<K> {
    slots: Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>,
}

impl<K> Clone for KeyedLocks<K> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Proof that the holder has exclusive access to `key`.
#[derive(Debug)]
pub struct KeyGuard<K> {
    key: K,
    _guard: OwnedMutexGuard<()>,
}

impl<K> KeyGuard<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: K) -> KeyGuard<K> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if slots.len() >= PRUNE_THRESHOLD {
                // A count of one means only the map holds it: nobody owns or awaits the slot.
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        KeyGuard {
            key,
            _guard: slot.lock_owned().await,
        }
    }

    /// Number of keys currently tracked, idle ones included.
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks: KeyedLocks<u32> = KeyedLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(1).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks: KeyedLocks<u32> = KeyedLocks::new();
        let first = locks.lock(1).await;
        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock(2)).await;

        assert!(second.is_ok());
        assert_eq!(*first.key(), 1);
    }

    #[tokio::test]
    async fn idle_slots_are_pruned() {
        let locks: KeyedLocks<usize> = KeyedLocks::new();
        for key in 0..PRUNE_THRESHOLD {
            drop(locks.lock(key).await);
        }
        let held = locks.lock(PRUNE_THRESHOLD).await;

        assert_eq!(locks.tracked(), 1);
        assert_eq!(*held.key(), PRUNE_THRESHOLD);
    }
}
