use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::AnchorProof;
use crate::evidence::ContentDigest;
use crate::store::ContentAddress;

/// How rigorously content was verified before notarization.
///
/// Ordered: each tier subsumes the guarantees of the ones below it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceLevel {
    Basic,
    Enhanced,
    Forensic,
    Legal,
}

impl EvidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceLevel::Basic => "basic",
            EvidenceLevel::Enhanced => "enhanced",
            EvidenceLevel::Forensic => "forensic",
            EvidenceLevel::Legal => "legal",
        }
    }

    /// Tier fee in GTT charged on top of backend costs
    pub fn fee(&self) -> f64 {
        match self {
            EvidenceLevel::Basic => 0.0,
            EvidenceLevel::Enhanced => 5.0,
            EvidenceLevel::Forensic => 15.0,
            EvidenceLevel::Legal => 50.0,
        }
    }
}

/// Lifecycle status of a notarization record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Stored,
    Anchored,
    Failed,
}

/// Machine-readable reason a notarization reached the terminal Failed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    StoreUnavailable,
    StoreTimeout,
    AnchorFailed,
    AnchorTimeout,
}

/// Details of a terminal failure, retained for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub reason: FailureReason,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

/// Cost breakdown reported on successful notarizations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub store_cost: f64,
    pub anchor_cost: f64,
    pub verification_overhead: f64,
    pub evidence_fee: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn new(
        store_cost: f64,
        anchor_cost: f64,
        verification_overhead: f64,
        evidence_fee: f64,
    ) -> Self {
        Self {
            store_cost,
            anchor_cost,
            verification_overhead,
            evidence_fee,
            total: store_cost + anchor_cost + verification_overhead + evidence_fee,
        }
    }
}

/// The tamper-evident record of one notarized submission.
///
/// Owned exclusively by the engine during creation; immutable once the
/// status is `Anchored` or `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotarizationRecord {
    pub id: Uuid,
    pub capsule_id: String,
    pub content_type: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_years: Option<u32>,
    pub content_digest: ContentDigest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_address: Option<ContentAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_proof: Option<AnchorProof>,
    pub evidence_level: EvidenceLevel,
    pub jurisdictions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<RecordFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostBreakdown>,
}

impl NotarizationRecord {
    pub fn is_anchored(&self) -> bool {
        self.status == RecordStatus::Anchored
    }
}
