use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{NotaryError, NotaryResult};
use crate::evidence::{canonical_json, ContentDigest, IssuerKey, SignatureInfo};
use crate::notarization::EvidenceLevel;
use crate::repository::{CertificateRepository, RecordRepository};

/// Evidentiary classification attached to a certificate, derived from the
/// record's evidence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegalWeight {
    Informational,
    Evidence,
    Certified,
    Notarized,
}

impl LegalWeight {
    /// Total mapping from evidence level; every tier maps to exactly one
    /// weight, checked exhaustively at compile time.
    pub fn from_level(level: EvidenceLevel) -> Self {
        match level {
            EvidenceLevel::Basic => LegalWeight::Informational,
            EvidenceLevel::Enhanced => LegalWeight::Evidence,
            EvidenceLevel::Forensic => LegalWeight::Certified,
            EvidenceLevel::Legal => LegalWeight::Notarized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LegalWeight::Informational => "informational",
            LegalWeight::Evidence => "evidence",
            LegalWeight::Certified => "certified",
            LegalWeight::Notarized => "notarized",
        }
    }
}

/// Certificate validity derived at query time; nothing is stored as status,
/// so a future `Revoked` terminal state is a visible extension here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Expired,
}

/// A signed attestation over one anchored notarization record.
///
/// Immutable after issuance. The signature covers the canonical
/// serialization of every other field plus the referenced record's content
/// digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: Uuid,
    pub notarization_record_id: Uuid,
    pub legal_weight: LegalWeight,
    pub jurisdictions: Vec<String>,
    pub purpose: String,
    pub requested_by: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub digital_signature: SignatureInfo,
}

impl Certificate {
    /// Canonical byte payload the issuer signs and verifiers recompute
    pub fn signing_payload(&self, content_digest: &ContentDigest) -> Vec<u8> {
        let value = serde_json::json!({
            "id": self.id,
            "notarizationRecordId": self.notarization_record_id,
            "legalWeight": self.legal_weight,
            "jurisdictions": self.jurisdictions,
            "purpose": self.purpose,
            "requestedBy": self.requested_by,
            "issuedAt": self.issued_at.to_rfc3339(),
            "expiresAt": self.expires_at.to_rfc3339(),
            "contentDigest": content_digest,
        });
        canonical_json(&value).into_bytes()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> CertificateStatus {
        if now >= self.expires_at {
            CertificateStatus::Expired
        } else {
            CertificateStatus::Valid
        }
    }

    pub fn status(&self) -> CertificateStatus {
        self.status_at(Utc::now())
    }
}

/// Validity period per evidence level, from the issuing authority's
/// retention schedule.
fn validity_years(level: EvidenceLevel) -> i64 {
    match level {
        EvidenceLevel::Basic => 1,
        EvidenceLevel::Enhanced => 10,
        EvidenceLevel::Forensic => 25,
        EvidenceLevel::Legal => 50,
    }
}

/// Converts anchored notarization records into signed certificates
pub struct CertificateIssuer {
    records: Arc<dyn RecordRepository>,
    certificates: Arc<dyn CertificateRepository>,
    issuer_key: Arc<IssuerKey>,
}

impl CertificateIssuer {
    pub fn new(
        records: Arc<dyn RecordRepository>,
        certificates: Arc<dyn CertificateRepository>,
        issuer_key: Arc<IssuerKey>,
    ) -> Self {
        Self {
            records,
            certificates,
            issuer_key,
        }
    }

    /// Issue a certificate for an anchored record.
    ///
    /// Re-issuing for the same (record, purpose) is permitted; every
    /// issuance gets a fresh id and timestamp.
    pub async fn issue(
        &self,
        notarization_record_id: Uuid,
        purpose: &str,
        requested_by: &str,
    ) -> NotaryResult<Certificate> {
        let record = self
            .records
            .load(notarization_record_id)
            .await?
            .ok_or_else(|| {
                NotaryError::NotFound(format!(
                    "notarization record {}",
                    notarization_record_id
                ))
            })?;

        if !record.is_anchored() {
            return Err(NotaryError::RecordNotAnchored(record.id.to_string()));
        }
        if record.evidence_level == EvidenceLevel::Basic {
            return Err(NotaryError::IneligibleEvidenceLevel(
                record.evidence_level.as_str().to_string(),
            ));
        }

        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::days(365 * validity_years(record.evidence_level));

        let mut certificate = Certificate {
            id: Uuid::new_v4(),
            notarization_record_id: record.id,
            legal_weight: LegalWeight::from_level(record.evidence_level),
            jurisdictions: record.jurisdictions.clone(),
            purpose: purpose.to_string(),
            requested_by: requested_by.to_string(),
            issued_at,
            expires_at,
            // Placeholder overwritten below; the payload excludes this field
            digital_signature: SignatureInfo {
                algorithm: String::new(),
                public_key: String::new(),
                signature: String::new(),
                signed_data_hash: String::new(),
            },
        };

        let payload = certificate.signing_payload(&record.content_digest);
        certificate.digital_signature = self.issuer_key.sign(&payload);

        self.certificates.save(&certificate).await?;

        tracing::info!(
            certificate_id = %certificate.id,
            record_id = %record.id,
            legal_weight = certificate.legal_weight.as_str(),
            "issued certificate"
        );

        Ok(certificate)
    }
}
