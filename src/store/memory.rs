use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

use super::{ContentAddress, ContentStore};
use crate::error::{NotaryError, NotaryResult};

/// In-memory content-addressed store for development and testing
///
/// Simulates a remote store without network calls. The failure knobs let
/// tests exercise the engine's unavailable/timeout paths, and `overwrite`
/// lets tamper-detection tests mutate stored content out from under a
/// recorded digest.
pub struct InMemoryStore {
    objects: Arc<RwLock<HashMap<ContentAddress, Vec<u8>>>>,

    /// Simulated network delay in milliseconds
    delay_ms: u64,

    /// Reject all writes (quota exceeded / unreachable)
    fail_puts: bool,

    /// Fail all reads as if the store cannot be reached
    offline: bool,

    /// Simulated cost per stored kilobyte in USD
    cost_per_kb: f64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_settings(0, false, false)
    }

    pub fn with_settings(delay_ms: u64, fail_puts: bool, offline: bool) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            delay_ms,
            fail_puts,
            offline,
            cost_per_kb: 0.0001,
        }
    }

    /// Store that rejects every put
    pub fn failing() -> Self {
        Self::with_settings(0, true, false)
    }

    /// Store whose reads fail as unreachable
    pub fn unreachable() -> Self {
        Self::with_settings(0, false, true)
    }

    /// Replace the bytes behind an address without changing the address.
    ///
    /// Only a misbehaving or compromised backend can do this in production;
    /// tests use it to prove the hash check catches exactly this case.
    pub async fn overwrite(&self, address: &ContentAddress, bytes: Vec<u8>) {
        self.objects.write().await.insert(address.clone(), bytes);
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn put(&self, bytes: &[u8]) -> NotaryResult<ContentAddress> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_puts {
            return Err(NotaryError::StoreUnavailable(
                "store rejected write".to_string(),
            ));
        }

        let address = ContentAddress::for_bytes(bytes);
        self.objects
            .write()
            .await
            .insert(address.clone(), bytes.to_vec());
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> NotaryResult<Option<Vec<u8>>> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.offline {
            return Err(NotaryError::StoreUnavailable(
                "store not reachable".to_string(),
            ));
        }

        Ok(self.objects.read().await.get(address).cloned())
    }

    async fn estimate_cost(&self, len: usize) -> NotaryResult<f64> {
        Ok(self.cost_per_kb * (len.max(1) as f64 / 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let store = InMemoryStore::new();
        let address = store.put(b"payload").await.unwrap();

        let bytes = store.get(&address).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn test_put_is_idempotent_per_content() {
        let store = InMemoryStore::new();
        let a = store.put(b"same").await.unwrap();
        let b = store.put(b"same").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_address_is_unavailable() {
        let store = InMemoryStore::new();
        let address = ContentAddress::for_bytes(b"never stored");
        assert!(store.get(&address).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failing_store_rejects_puts() {
        let store = InMemoryStore::failing();
        let result = store.put(b"payload").await;
        assert!(matches!(result, Err(NotaryError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_store_errors_on_get() {
        let store = InMemoryStore::unreachable();
        let address = store.put(b"payload").await.unwrap();
        assert!(store.get(&address).await.is_err());
    }

    #[tokio::test]
    async fn test_overwrite_changes_bytes_behind_address() {
        let store = InMemoryStore::new();
        let address = store.put(b"original").await.unwrap();

        store.overwrite(&address, b"tampered".to_vec()).await;

        let bytes = store.get(&address).await.unwrap().unwrap();
        assert_eq!(bytes, b"tampered");
    }

    #[tokio::test]
    async fn test_estimate_cost_scales_with_size() {
        let store = InMemoryStore::new();
        let small = store.estimate_cost(1024).await.unwrap();
        let large = store.estimate_cost(10 * 1024).await.unwrap();
        assert!(large > small);
    }
}
