//! Type-safe state machine for an in-flight notarization.
//!
//! Each state is a distinct type and each transition consumes the current
//! state, so a submission cannot skip a step or advance without the prior
//! step's artifact: the digest is required to store, the content address to
//! anchor. The persisted `RecordStatus` mirrors whichever state a submission
//! ended in.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::record::{
    CostBreakdown, EvidenceLevel, FailureReason, NotarizationRecord, RecordFailure, RecordStatus,
};
use crate::anchor::AnchorProof;
use crate::evidence::ContentDigest;
use crate::store::ContentAddress;

/// An in-flight notarization with type-safe state
#[derive(Debug, Clone)]
pub struct Submission<S> {
    pub id: Uuid,
    pub state: S,
    pub meta: SubmissionMetadata,
}

/// Metadata available in all states
#[derive(Debug, Clone)]
pub struct SubmissionMetadata {
    pub capsule_id: String,
    pub content_type: String,
    pub is_public: bool,
    pub retention_years: Option<u32>,
    pub evidence_level: EvidenceLevel,
    pub jurisdictions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Pending — digest computed, nothing persisted yet
#[derive(Debug, Clone)]
pub struct Pending {
    pub digest: ContentDigest,
}

/// Stored — content persisted in the content store
#[derive(Debug, Clone)]
pub struct Stored {
    pub digest: ContentDigest,
    pub address: ContentAddress,
    pub store_cost: f64,
}

/// Anchored — commitment included in the anchor ledger (terminal)
#[derive(Debug, Clone)]
pub struct Anchored {
    pub digest: ContentDigest,
    pub address: ContentAddress,
    pub proof: AnchorProof,
    pub cost: CostBreakdown,
}

/// Failed — terminal, retained for audit, never retried automatically
#[derive(Debug, Clone)]
pub struct Failed {
    pub digest: ContentDigest,
    /// Present when the failure happened after storage succeeded; the
    /// content stays in the store (never unwound on anchor failure).
    pub address: Option<ContentAddress>,
    pub reason: FailureReason,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

impl<S> Submission<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Pending State Transitions
// ============================================================================

impl Submission<Pending> {
    /// Create a new submission from a freshly computed digest
    pub fn new(meta: SubmissionMetadata, digest: ContentDigest) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Pending { digest },
            meta,
        }
    }

    /// Transition to Stored after the content store accepted the envelope
    pub fn store(self, address: ContentAddress, store_cost: f64) -> Submission<Stored> {
        Submission {
            id: self.id,
            state: Stored {
                digest: self.state.digest,
                address,
                store_cost,
            },
            meta: self.meta,
        }
    }

    /// Transition to Failed (store step never succeeded)
    pub fn fail(self, reason: FailureReason, message: String) -> Submission<Failed> {
        Submission {
            id: self.id,
            state: Failed {
                digest: self.state.digest,
                address: None,
                reason,
                message,
                failed_at: Utc::now(),
            },
            meta: self.meta,
        }
    }
}

// ============================================================================
// Stored State Transitions
// ============================================================================

impl Submission<Stored> {
    /// Transition to Anchored after the ledger confirmed the commitment
    pub fn anchor(
        self,
        proof: AnchorProof,
        verification_overhead: f64,
    ) -> Submission<Anchored> {
        let cost = CostBreakdown::new(
            self.state.store_cost,
            proof.inclusion_cost,
            verification_overhead,
            self.meta.evidence_level.fee(),
        );
        Submission {
            id: self.id,
            state: Anchored {
                digest: self.state.digest,
                address: self.state.address,
                proof,
                cost,
            },
            meta: self.meta,
        }
    }

    /// Transition to Failed; stored content is kept for later re-anchoring
    pub fn fail(self, reason: FailureReason, message: String) -> Submission<Failed> {
        Submission {
            id: self.id,
            state: Failed {
                digest: self.state.digest,
                address: Some(self.state.address),
                reason,
                message,
                failed_at: Utc::now(),
            },
            meta: self.meta,
        }
    }
}

// ============================================================================
// Record projection
// ============================================================================

impl Submission<Pending> {
    pub fn to_record(&self) -> NotarizationRecord {
        record_base(self.id, &self.meta, self.state.digest.clone(), RecordStatus::Pending)
    }
}

impl Submission<Stored> {
    pub fn to_record(&self) -> NotarizationRecord {
        let mut record = record_base(
            self.id,
            &self.meta,
            self.state.digest.clone(),
            RecordStatus::Stored,
        );
        record.content_address = Some(self.state.address.clone());
        record
    }
}

impl Submission<Anchored> {
    pub fn into_record(self) -> NotarizationRecord {
        let mut record = record_base(
            self.id,
            &self.meta,
            self.state.digest,
            RecordStatus::Anchored,
        );
        record.content_address = Some(self.state.address);
        record.anchor_proof = Some(self.state.proof);
        record.cost = Some(self.state.cost);
        record
    }
}

impl Submission<Failed> {
    pub fn into_record(self) -> NotarizationRecord {
        let mut record = record_base(
            self.id,
            &self.meta,
            self.state.digest,
            RecordStatus::Failed,
        );
        record.content_address = self.state.address;
        record.failure = Some(RecordFailure {
            reason: self.state.reason,
            message: self.state.message,
            failed_at: self.state.failed_at,
        });
        record
    }
}

fn record_base(
    id: Uuid,
    meta: &SubmissionMetadata,
    digest: ContentDigest,
    status: RecordStatus,
) -> NotarizationRecord {
    NotarizationRecord {
        id,
        capsule_id: meta.capsule_id.clone(),
        content_type: meta.content_type.clone(),
        is_public: meta.is_public,
        retention_years: meta.retention_years,
        content_digest: digest,
        content_address: None,
        anchor_proof: None,
        evidence_level: meta.evidence_level,
        jurisdictions: meta.jurisdictions.clone(),
        created_at: meta.created_at,
        status,
        failure: None,
        cost: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_meta() -> SubmissionMetadata {
        SubmissionMetadata {
            capsule_id: "cap-1".to_string(),
            content_type: "text/plain".to_string(),
            is_public: false,
            retention_years: None,
            evidence_level: EvidenceLevel::Legal,
            jurisdictions: vec!["US".to_string()],
            created_at: Utc::now(),
        }
    }

    fn test_proof() -> AnchorProof {
        AnchorProof {
            transaction_id: "0xfeed".to_string(),
            sequence_number: 1,
            inclusion_cost: 0.01,
            anchored_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_to_stored() {
        let digest = ContentDigest::from_bytes(b"x");
        let submission = Submission::new(test_meta(), digest.clone());
        let id = submission.id();

        let address = ContentAddress::for_bytes(b"x");
        let submission = submission.store(address.clone(), 0.001);

        assert_eq!(submission.id(), id);
        assert_eq!(submission.state.digest, digest);
        assert_eq!(submission.state.address, address);
    }

    #[test]
    fn test_stored_to_anchored_builds_cost() {
        let submission = Submission::new(test_meta(), ContentDigest::from_bytes(b"x"))
            .store(ContentAddress::for_bytes(b"x"), 0.002);

        let submission = submission.anchor(test_proof(), 0.05);
        let cost = &submission.state.cost;

        assert_eq!(cost.store_cost, 0.002);
        assert_eq!(cost.anchor_cost, 0.01);
        assert_eq!(cost.verification_overhead, 0.05);
        assert_eq!(cost.evidence_fee, 50.0);

        let record = submission.into_record();
        assert_eq!(record.status, RecordStatus::Anchored);
        assert!(record.anchor_proof.is_some());
    }

    #[test]
    fn test_pending_failure_has_no_address() {
        let submission = Submission::new(test_meta(), ContentDigest::from_bytes(b"x"));
        let record = submission
            .fail(FailureReason::StoreUnavailable, "down".to_string())
            .into_record();

        assert_eq!(record.status, RecordStatus::Failed);
        assert!(record.content_address.is_none());
        assert_eq!(
            record.failure.unwrap().reason,
            FailureReason::StoreUnavailable
        );
    }

    #[test]
    fn test_stored_failure_keeps_address() {
        let address = ContentAddress::for_bytes(b"x");
        let record = Submission::new(test_meta(), ContentDigest::from_bytes(b"x"))
            .store(address.clone(), 0.001)
            .fail(FailureReason::AnchorTimeout, "timed out".to_string())
            .into_record();

        assert_eq!(record.status, RecordStatus::Failed);
        assert_eq!(record.content_address, Some(address));
        assert_eq!(record.failure.unwrap().reason, FailureReason::AnchorTimeout);
    }
}
