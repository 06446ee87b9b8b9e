//! Independent re-verification of records and certificates.
//!
//! Every verdict lists its individual checks by name so a caller can see
//! exactly which property failed. An unreachable backend never produces
//! `Invalid`: absence of evidence is reported as `Inconclusive`, only
//! positive evidence of tampering condemns a subject.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchor::{AnchorLedger, InclusionStatus};
use crate::certificate::Certificate;
use crate::error::{NotaryError, NotaryResult};
use crate::evidence::{ContentDigest, IssuerKey};
use crate::notarization::NotarizationRecord;
use crate::repository::{CertificateRepository, RecordRepository};
use crate::store::ContentStore;

/// Outcome of a single named check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckResult {
    Valid,
    Invalid,
    Inconclusive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCheck {
    pub name: String,
    pub result: CheckResult,
}

impl VerificationCheck {
    fn new(name: &str, result: CheckResult) -> Self {
        Self {
            name: name.to_string(),
            result,
        }
    }
}

/// The full verdict for one verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationVerdict {
    pub subject_id: Uuid,
    pub subject_type: String,
    pub checks: Vec<VerificationCheck>,
    pub overall_result: CheckResult,
    pub verified_at: DateTime<Utc>,
}

/// Valid only when every check is valid; any invalid check condemns the
/// whole subject; otherwise inconclusive.
fn combine(checks: &[VerificationCheck]) -> CheckResult {
    if checks.iter().any(|c| c.result == CheckResult::Invalid) {
        CheckResult::Invalid
    } else if checks.iter().all(|c| c.result == CheckResult::Valid) {
        CheckResult::Valid
    } else {
        CheckResult::Inconclusive
    }
}

pub struct VerificationService {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn AnchorLedger>,
    records: Arc<dyn RecordRepository>,
    certificates: Arc<dyn CertificateRepository>,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn AnchorLedger>,
        records: Arc<dyn RecordRepository>,
        certificates: Arc<dyn CertificateRepository>,
    ) -> Self {
        Self {
            store,
            ledger,
            records,
            certificates,
        }
    }

    /// Re-verify a notarization record against the live backends
    pub async fn verify_record(&self, record_id: Uuid) -> NotaryResult<VerificationVerdict> {
        let record = self
            .records
            .load(record_id)
            .await?
            .ok_or_else(|| NotaryError::NotFound(format!("notarization record {}", record_id)))?;

        let checks = self.record_checks(&record).await;
        Ok(self.verdict(record.id, "notarization_record", checks))
    }

    /// Re-verify a certificate: the underlying record plus the signature
    /// and expiry of the certificate itself.
    pub async fn verify_certificate(
        &self,
        certificate_id: Uuid,
    ) -> NotaryResult<VerificationVerdict> {
        let certificate = self
            .certificates
            .load(certificate_id)
            .await?
            .ok_or_else(|| NotaryError::NotFound(format!("certificate {}", certificate_id)))?;

        let record = self.records.load(certificate.notarization_record_id).await?;

        let mut checks = match &record {
            Some(record) => self.record_checks(record).await,
            // Without the record the backend checks cannot even start
            None => vec![
                VerificationCheck::new("content_availability", CheckResult::Inconclusive),
                VerificationCheck::new("content_hash", CheckResult::Inconclusive),
                VerificationCheck::new("ledger_inclusion", CheckResult::Inconclusive),
            ],
        };

        checks.push(self.signature_check(&certificate, record.as_ref()));
        checks.push(VerificationCheck::new(
            "certificate_expiry",
            if Utc::now() < certificate.expires_at {
                CheckResult::Valid
            } else {
                CheckResult::Invalid
            },
        ));

        Ok(self.verdict(certificate.id, "certificate", checks))
    }

    async fn record_checks(&self, record: &NotarizationRecord) -> Vec<VerificationCheck> {
        let mut checks = Vec::with_capacity(3);

        // Availability and hash share one store read
        let (availability, hash) = match &record.content_address {
            Some(address) => match self.store.get(address).await {
                Ok(Some(bytes)) => {
                    let recomputed = ContentDigest::from_bytes(&bytes);
                    let hash = if recomputed == record.content_digest {
                        CheckResult::Valid
                    } else {
                        CheckResult::Invalid
                    };
                    (CheckResult::Valid, hash)
                }
                // Absent is not proof of tampering
                Ok(None) => (CheckResult::Inconclusive, CheckResult::Inconclusive),
                Err(err) => {
                    tracing::warn!(record_id = %record.id, %err, "content store unreachable");
                    (CheckResult::Inconclusive, CheckResult::Inconclusive)
                }
            },
            None => (CheckResult::Inconclusive, CheckResult::Inconclusive),
        };
        checks.push(VerificationCheck::new("content_availability", availability));
        checks.push(VerificationCheck::new("content_hash", hash));

        let inclusion = match &record.anchor_proof {
            Some(proof) => match self.ledger.query_inclusion(&proof.transaction_id).await {
                Ok(InclusionStatus::Included) => CheckResult::Valid,
                Ok(InclusionStatus::NotFound) => CheckResult::Invalid,
                Err(err) => {
                    tracing::warn!(record_id = %record.id, %err, "anchor ledger unreachable");
                    CheckResult::Inconclusive
                }
            },
            None => CheckResult::Inconclusive,
        };
        checks.push(VerificationCheck::new("ledger_inclusion", inclusion));

        checks
    }

    fn signature_check(
        &self,
        certificate: &Certificate,
        record: Option<&NotarizationRecord>,
    ) -> VerificationCheck {
        let result = match record {
            Some(record) => {
                let payload = certificate.signing_payload(&record.content_digest);
                match IssuerKey::verify(
                    &certificate.digital_signature.public_key,
                    &certificate.digital_signature.signature,
                    &payload,
                ) {
                    Ok(true) => CheckResult::Valid,
                    // A malformed or mismatching signature is positive
                    // evidence, not an unreachable backend
                    Ok(false) | Err(_) => CheckResult::Invalid,
                }
            }
            None => CheckResult::Inconclusive,
        };
        VerificationCheck::new("certificate_signature", result)
    }

    fn verdict(
        &self,
        subject_id: Uuid,
        subject_type: &str,
        checks: Vec<VerificationCheck>,
    ) -> VerificationVerdict {
        let overall_result = combine(&checks);
        tracing::info!(
            %subject_id,
            subject_type,
            ?overall_result,
            "verification completed"
        );
        VerificationVerdict {
            subject_id,
            subject_type: subject_type.to_string(),
            checks,
            overall_result,
            verified_at: Utc::now(),
        }
    }
}
