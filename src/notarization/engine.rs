//! Orchestrates the notarization pipeline: hash, store, anchor.
//!
//! Backend failures are not errors from the caller's point of view. The
//! engine converts them into terminal `Failed` records with a machine
//! readable reason, and the record is persisted at every status transition
//! so a crash mid-pipeline leaves an inspectable trail.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use uuid::Uuid;

use super::record::{FailureReason, NotarizationRecord};
use super::submission::{Pending, Stored, Submission, SubmissionMetadata};
use crate::anchor::{AnchorLedger, AnchorProof};
use crate::config::NotaryConfig;
use crate::error::{NotaryError, NotaryResult};
use crate::evidence::{ContentDigest, ContentEnvelope, IssuerKey};
use crate::repository::RecordRepository;
use crate::store::{ContentAddress, ContentStore};

/// One notarization request, already decoded from the wire
#[derive(Debug, Clone)]
pub struct NotarizeInput {
    pub capsule_id: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub metadata: Value,
    pub evidence_level: super::record::EvidenceLevel,
    pub jurisdictions: Vec<String>,
    pub is_public: bool,
    pub retention_years: Option<u32>,
}

/// Everything an independent party needs to re-verify one anchored record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBundle {
    pub record_id: Uuid,
    pub capsule_id: String,
    pub content_digest: ContentDigest,
    pub content_address: ContentAddress,
    pub anchor_proof: AnchorProof,
    pub issuer_public_key: String,
    pub instructions: String,
}

pub struct NotarizationEngine {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn AnchorLedger>,
    records: Arc<dyn RecordRepository>,
    issuer_key: Arc<IssuerKey>,
    store_timeout: Duration,
    anchor_timeout: Duration,
    verification_overhead: f64,
}

impl NotarizationEngine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn AnchorLedger>,
        records: Arc<dyn RecordRepository>,
        issuer_key: Arc<IssuerKey>,
        config: &NotaryConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            records,
            issuer_key,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            anchor_timeout: Duration::from_millis(config.anchor_timeout_ms),
            verification_overhead: config.verification_overhead,
        }
    }

    /// Run the full pipeline for one submission.
    ///
    /// Returns the terminal record: `Anchored` on success, `Failed` when a
    /// backend was unavailable, rejected, or timed out. Validation problems
    /// are the only `Err` path.
    pub async fn notarize(&self, input: NotarizeInput) -> NotaryResult<NotarizationRecord> {
        let jurisdictions = validate_input(&input)?;

        let envelope = ContentEnvelope::new(input.content, input.metadata);
        let bytes = envelope.canonical_bytes();
        let digest = ContentDigest::from_envelope(&envelope);

        let meta = SubmissionMetadata {
            capsule_id: input.capsule_id,
            content_type: input.content_type,
            is_public: input.is_public,
            retention_years: input.retention_years,
            evidence_level: input.evidence_level,
            jurisdictions,
            created_at: chrono::Utc::now(),
        };
        let submission = Submission::new(meta, digest);

        tracing::info!(
            submission_id = %submission.id(),
            capsule_id = %submission.meta.capsule_id,
            evidence_level = submission.meta.evidence_level.as_str(),
            "notarization started"
        );
        self.records.save(&submission.to_record()).await?;

        let submission = match self.store_step(submission, &bytes).await {
            Ok(stored) => stored,
            Err(record) => return Ok(record),
        };
        self.records.save(&submission.to_record()).await?;

        match self.anchor_step(submission).await {
            Ok(record) => {
                self.records.save(&record).await?;
                tracing::info!(record_id = %record.id, "notarization anchored");
                Ok(record)
            }
            Err(record) => Ok(record),
        }
    }

    /// Store step; on failure persists and returns the Failed record
    async fn store_step(
        &self,
        submission: Submission<Pending>,
        bytes: &[u8],
    ) -> Result<Submission<Stored>, NotarizationRecord> {
        let store_cost = self
            .store
            .estimate_cost(bytes.len())
            .await
            .unwrap_or_default();

        match timeout(self.store_timeout, self.store.put(bytes)).await {
            Ok(Ok(address)) => Ok(submission.store(address, store_cost)),
            Ok(Err(err)) => {
                Err(self
                    .fail_pending(submission, FailureReason::StoreUnavailable, err.to_string())
                    .await)
            }
            Err(_) => {
                Err(self
                    .fail_pending(
                        submission,
                        FailureReason::StoreTimeout,
                        format!("store did not respond within {:?}", self.store_timeout),
                    )
                    .await)
            }
        }
    }

    /// Anchor step; on failure persists and returns the Failed record
    async fn anchor_step(
        &self,
        submission: Submission<Stored>,
    ) -> Result<NotarizationRecord, NotarizationRecord> {
        let digest = submission.state.digest.clone();
        let address = submission.state.address.clone();

        match timeout(self.anchor_timeout, self.ledger.commit(&digest, &address)).await {
            Ok(Ok(proof)) => Ok(submission
                .anchor(proof, self.verification_overhead)
                .into_record()),
            Ok(Err(err)) => {
                Err(self
                    .fail_stored(submission, FailureReason::AnchorFailed, err.to_string())
                    .await)
            }
            Err(_) => {
                Err(self
                    .fail_stored(
                        submission,
                        FailureReason::AnchorTimeout,
                        format!("ledger did not respond within {:?}", self.anchor_timeout),
                    )
                    .await)
            }
        }
    }

    async fn fail_pending(
        &self,
        submission: Submission<Pending>,
        reason: FailureReason,
        message: String,
    ) -> NotarizationRecord {
        tracing::warn!(submission_id = %submission.id(), ?reason, %message, "notarization failed");
        let record = submission.fail(reason, message).into_record();
        self.persist_failure(&record).await;
        record
    }

    async fn fail_stored(
        &self,
        submission: Submission<Stored>,
        reason: FailureReason,
        message: String,
    ) -> NotarizationRecord {
        tracing::warn!(submission_id = %submission.id(), ?reason, %message, "notarization failed");
        let record = submission.fail(reason, message).into_record();
        self.persist_failure(&record).await;
        record
    }

    async fn persist_failure(&self, record: &NotarizationRecord) {
        if let Err(err) = self.records.save(record).await {
            tracing::error!(record_id = %record.id, %err, "failed to persist failure record");
        }
    }

    pub async fn get_record(&self, id: Uuid) -> NotaryResult<Option<NotarizationRecord>> {
        self.records.load(id).await
    }

    /// Assemble the downloadable proof bundle for an anchored record
    pub async fn proof_bundle(&self, record_id: Uuid) -> NotaryResult<ProofBundle> {
        let record = self
            .records
            .load(record_id)
            .await?
            .ok_or_else(|| NotaryError::NotFound(format!("notarization record {}", record_id)))?;

        let (address, proof) = match (record.content_address, record.anchor_proof) {
            (Some(address), Some(proof)) if record.status == super::record::RecordStatus::Anchored => {
                (address, proof)
            }
            _ => return Err(NotaryError::RecordNotAnchored(record.id.to_string())),
        };

        Ok(ProofBundle {
            record_id: record.id,
            capsule_id: record.capsule_id,
            content_digest: record.content_digest,
            content_address: address,
            anchor_proof: proof,
            issuer_public_key: self.issuer_key.public_key_b64(),
            instructions: PROOF_INSTRUCTIONS.to_string(),
        })
    }
}

const PROOF_INSTRUCTIONS: &str = "\
To verify this notarization independently:\n\
1. Fetch the content envelope from the content store at contentAddress.\n\
2. Compute the SHA-256 hash of the fetched bytes and compare it with\n\
   contentDigest.value. Any difference means the content was altered.\n\
3. Query the anchor ledger for anchorProof.transactionId and confirm the\n\
   commitment is included.\n\
4. Certificates referencing this record are signed with Ed25519 under\n\
   issuerPublicKey (base64).\n";

/// Jurisdiction codes are 2-3 ASCII letters, normalized to uppercase
fn validate_input(input: &NotarizeInput) -> NotaryResult<Vec<String>> {
    if input.capsule_id.trim().is_empty() {
        return Err(NotaryError::Validation("capsuleId must not be empty".to_string()));
    }
    if input.content.is_empty() {
        return Err(NotaryError::Validation("content must not be empty".to_string()));
    }
    if input.jurisdictions.is_empty() {
        return Err(NotaryError::Validation(
            "at least one jurisdiction is required".to_string(),
        ));
    }

    let mut normalized = Vec::with_capacity(input.jurisdictions.len());
    for code in &input.jurisdictions {
        let code = code.trim();
        if !(2..=3).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(NotaryError::Validation(format!(
                "invalid jurisdiction code: {:?}",
                code
            )));
        }
        normalized.push(code.to_ascii_uppercase());
    }
    Ok(normalized)
}
