use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

use super::{AnchorLedger, AnchorProof, InclusionStatus};
use crate::error::{NotaryError, NotaryResult};
use crate::evidence::ContentDigest;
use crate::store::ContentAddress;

/// In-memory anchor ledger for development and testing
///
/// Simulates an append-only ledger without network calls or gas costs.
/// Commitments are keyed by digest, so re-anchoring an identical digest
/// returns the original proof instead of minting a second one.
pub struct InMemoryLedger {
    inner: Arc<RwLock<LedgerState>>,

    /// Simulated network delay in milliseconds
    delay_ms: u64,

    /// Reject new commitments (out of funds, contract revert)
    reject_commits: bool,

    /// Fail all calls as if the ledger cannot be reached
    offline: bool,

    /// Simulated cost per anchor in USD
    cost_per_anchor: f64,
}

struct LedgerState {
    /// digest value -> issued proof
    anchors: HashMap<String, AnchorProof>,
    /// transaction id -> digest value, for inclusion queries
    transactions: HashMap<String, String>,
    next_sequence: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_settings(0, false, false)
    }

    pub fn with_settings(delay_ms: u64, reject_commits: bool, offline: bool) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerState {
                anchors: HashMap::new(),
                transactions: HashMap::new(),
                next_sequence: 1,
            })),
            delay_ms,
            reject_commits,
            offline,
            cost_per_anchor: 0.01,
        }
    }

    /// Ledger that rejects every commitment
    pub fn rejecting() -> Self {
        Self::with_settings(0, true, false)
    }

    /// Ledger whose calls fail as unreachable
    pub fn unreachable() -> Self {
        Self::with_settings(0, false, true)
    }

    pub async fn anchor_count(&self) -> usize {
        self.inner.read().await.anchors.len()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction ids are derived from the committed digest and the sequence
/// slot, so a replayed commit cannot fabricate a fresh-looking transaction.
fn transaction_id(digest: &ContentDigest, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(digest.value.as_bytes());
    hasher.update(sequence.to_be_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[async_trait]
impl AnchorLedger for InMemoryLedger {
    async fn commit(
        &self,
        digest: &ContentDigest,
        _address: &ContentAddress,
    ) -> NotaryResult<AnchorProof> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.offline {
            return Err(NotaryError::LedgerUnreachable(
                "ledger not reachable".to_string(),
            ));
        }

        let mut state = self.inner.write().await;

        // Idempotent duplicate handling: one live proof per digest
        if let Some(existing) = state.anchors.get(&digest.value) {
            return Ok(existing.clone());
        }

        if self.reject_commits {
            return Err(NotaryError::AnchorRejected(
                "commitment rejected by ledger".to_string(),
            ));
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let proof = AnchorProof {
            transaction_id: transaction_id(digest, sequence),
            sequence_number: sequence,
            inclusion_cost: self.cost_per_anchor,
            anchored_at: Utc::now(),
        };

        state
            .transactions
            .insert(proof.transaction_id.clone(), digest.value.clone());
        state.anchors.insert(digest.value.clone(), proof.clone());
        Ok(proof)
    }

    async fn query_inclusion(&self, transaction_id: &str) -> NotaryResult<InclusionStatus> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        if self.offline {
            return Err(NotaryError::LedgerUnreachable(
                "ledger not reachable".to_string(),
            ));
        }

        let state = self.inner.read().await;
        if state.transactions.contains_key(transaction_id) {
            Ok(InclusionStatus::Included)
        } else {
            Ok(InclusionStatus::NotFound)
        }
    }

    async fn estimate_cost(&self) -> NotaryResult<f64> {
        Ok(self.cost_per_anchor)
    }
}
