//! In-memory staging store.
//!
//! Mutex-guarded map with per-entry expiry. Expired entries are evicted
//! lazily on access; there is no background sweeper. All operations on one
//! store serialize on the same lock, which gives `compare_and_swap` its
//! atomicity.

use crate::traits::{StagingResult, StagingStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-memory [`StagingStore`] implementation.
#[derive(Default)]
pub struct MemoryStagingStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries, for tests and diagnostics.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        entries.values().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StagingStore for MemoryStagingStore {
    async fn get(&self, key: &str) -> StagingResult<Option<Bytes>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Bytes, ttl: Duration) -> StagingResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&Bytes>,
        value: Bytes,
        ttl: Duration,
    ) -> StagingResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        let current = entries.get(key).filter(|e| !e.is_expired(now));
        let matches = match (current, expected) {
            (Some(entry), Some(expected)) => entry.value == *expected,
            (None, None) => true,
            _ => false,
        };
        if matches {
            entries.insert(
                key.to_string(),
                Entry {
                    value,
                    expires_at: now + ttl,
                },
            );
        }
        Ok(matches)
    }

    async fn delete(&self, key: &str) -> StagingResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> StagingResult<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStagingStore::new();
        store
            .put("upload:x", Bytes::from_static(b"v1"), ttl())
            .await
            .unwrap();
        assert_eq!(
            store.get("upload:x").await.unwrap(),
            Some(Bytes::from_static(b"v1"))
        );
        store.delete("upload:x").await.unwrap();
        assert_eq!(store.get("upload:x").await.unwrap(), None);
        // deleting again is fine
        store.delete("upload:x").await.unwrap();
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryStagingStore::new();
        store
            .put("chunk:a:0", Bytes::from_static(b"v"), Duration::from_millis(30))
            .await
            .unwrap();
        assert!(store.get("chunk:a:0").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.get("chunk:a:0").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_by_prefix() {
        let store = MemoryStagingStore::new();
        store
            .put("chunk:a:1", Bytes::from_static(b"1"), ttl())
            .await
            .unwrap();
        store
            .put("chunk:a:0", Bytes::from_static(b"0"), ttl())
            .await
            .unwrap();
        store
            .put("chunk:b:0", Bytes::from_static(b"x"), ttl())
            .await
            .unwrap();
        let keys = store.list_keys("chunk:a:").await.unwrap();
        assert_eq!(keys, vec!["chunk:a:0", "chunk:a:1"]);
    }

    #[tokio::test]
    async fn test_compare_and_swap_detects_conflict() {
        let store = MemoryStagingStore::new();
        let v1 = Bytes::from_static(b"v1");
        let v2 = Bytes::from_static(b"v2");
        let v3 = Bytes::from_static(b"v3");

        // absent key: expected None wins, expected Some loses
        assert!(!store
            .compare_and_swap("k", Some(&v1), v2.clone(), ttl())
            .await
            .unwrap());
        assert!(store
            .compare_and_swap("k", None, v1.clone(), ttl())
            .await
            .unwrap());

        // stale expectation loses after an interleaved write
        store.put("k", v2.clone(), ttl()).await.unwrap();
        assert!(!store
            .compare_and_swap("k", Some(&v1), v3.clone(), ttl())
            .await
            .unwrap());
        assert!(store
            .compare_and_swap("k", Some(&v2), v3.clone(), ttl())
            .await
            .unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(v3));
    }

    #[tokio::test]
    async fn test_compare_and_swap_treats_expired_as_absent() {
        let store = MemoryStagingStore::new();
        store
            .put("k", Bytes::from_static(b"old"), Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let old = Bytes::from_static(b"old");
        assert!(!store
            .compare_and_swap("k", Some(&old), Bytes::from_static(b"new"), ttl())
            .await
            .unwrap());
        assert!(store
            .compare_and_swap("k", None, Bytes::from_static(b"new"), ttl())
            .await
            .unwrap());
    }
}
