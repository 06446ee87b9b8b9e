pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::NotaryResult;

/// Opaque, content-derived locator returned by a content store.
///
/// Dereferencing the same address yields byte-identical content or an
/// explicit "unavailable" result, never different content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Derive the address for a byte payload
    pub fn for_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("cas:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for content-addressed storage backends (IPFS-compatible interface)
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a byte payload; returns its content address.
    ///
    /// Errors mean the store is unreachable or rejected the write.
    async fn put(&self, bytes: &[u8]) -> NotaryResult<ContentAddress>;

    /// Retrieve a payload by address.
    ///
    /// `Ok(None)` means the address is known-unavailable; errors mean the
    /// store itself could not be reached.
    async fn get(&self, address: &ContentAddress) -> NotaryResult<Option<Vec<u8>>>;

    /// Estimate storage cost in USD for a payload of the given size
    async fn estimate_cost(&self, len: usize) -> NotaryResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_content_derived() {
        let a = ContentAddress::for_bytes(b"same bytes");
        let b = ContentAddress::for_bytes(b"same bytes");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("cas:"));
    }

    #[test]
    fn test_address_differs_for_different_bytes() {
        let a = ContentAddress::for_bytes(b"one");
        let b = ContentAddress::for_bytes(b"two");
        assert_ne!(a, b);
    }
}
