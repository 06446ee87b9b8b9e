pub mod memory;

pub use memory::InMemoryLedger;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotaryResult;
use crate::evidence::ContentDigest;
use crate::store::ContentAddress;

/// Proof that a commitment was included in the anchor ledger.
///
/// Immutable once issued; sequence numbers are monotonically non-decreasing
/// across successive anchors from the same ledger session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorProof {
    pub transaction_id: String,
    pub sequence_number: u64,
    pub inclusion_cost: f64,
    pub anchored_at: DateTime<Utc>,
}

/// Result of an inclusion query for a previously issued transaction id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionStatus {
    Included,
    NotFound,
}

/// Trait for append-only anchor ledger backends (blockchain-compatible
/// interface)
#[async_trait]
pub trait AnchorLedger: Send + Sync {
    /// Commit a (digest, content address) pair to the ledger.
    ///
    /// Committing the same digest twice must be idempotent: the original
    /// proof is returned rather than a second live proof being created.
    async fn commit(
        &self,
        digest: &ContentDigest,
        address: &ContentAddress,
    ) -> NotaryResult<AnchorProof>;

    /// Check whether a transaction id is included in the ledger.
    ///
    /// Errors mean the ledger could not be reached — callers must treat that
    /// as inconclusive, never as "not included".
    async fn query_inclusion(&self, transaction_id: &str) -> NotaryResult<InclusionStatus>;

    /// Estimate the cost of one anchor commitment in USD
    async fn estimate_cost(&self) -> NotaryResult<f64>;
}
