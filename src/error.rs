use thiserror::Error;

/// Central error type for the notarization pipeline
///
/// Backend failures that occur while a notarization is in flight are not
/// surfaced through this type; they are captured on the record as a terminal
/// `Failed` status with a machine-readable reason. This enum covers input
/// validation, issuance preconditions, and genuinely unexpected conditions.
#[derive(Error, Debug)]
pub enum NotaryError {
    // ============================================================================
    // Validation Errors (caller's fault)
    // ============================================================================
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ============================================================================
    // Content Store Errors
    // ============================================================================
    #[error("Content store unavailable: {0}")]
    StoreUnavailable(String),

    // ============================================================================
    // Anchor Ledger Errors
    // ============================================================================
    #[error("Anchor commitment rejected: {0}")]
    AnchorRejected(String),

    #[error("Anchor ledger unreachable: {0}")]
    LedgerUnreachable(String),

    // ============================================================================
    // Certificate Errors
    // ============================================================================
    #[error("Evidence level '{0}' is not eligible for certificate issuance")]
    IneligibleEvidenceLevel(String),

    #[error("Notarization record {0} is not anchored")]
    RecordNotAnchored(String),

    #[error("Failed to sign certificate: {0}")]
    SigningFailed(String),

    #[error("Signature verification failed: {0}")]
    VerificationFailed(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotaryError {
    /// Machine-readable reason code included in every failure response
    pub fn reason_code(&self) -> &'static str {
        match self {
            NotaryError::Validation(_) => "VALIDATION_ERROR",
            NotaryError::NotFound(_) => "NOT_FOUND",
            NotaryError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            NotaryError::AnchorRejected(_) => "ANCHOR_REJECTED",
            NotaryError::LedgerUnreachable(_) => "LEDGER_UNREACHABLE",
            NotaryError::IneligibleEvidenceLevel(_) => "INELIGIBLE_EVIDENCE_LEVEL",
            NotaryError::RecordNotAnchored(_) => "RECORD_NOT_ANCHORED",
            NotaryError::SigningFailed(_) => "SIGNING_FAILED",
            NotaryError::VerificationFailed(_) => "VERIFICATION_FAILED",
            NotaryError::Io(_) => "IO_ERROR",
            NotaryError::Json(_) => "SERIALIZATION_ERROR",
            NotaryError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// Automatic conversion from base64::DecodeError (signature/key decoding)
impl From<base64::DecodeError> for NotaryError {
    fn from(err: base64::DecodeError) -> Self {
        NotaryError::VerificationFailed(format!("Base64 decode error: {}", err))
    }
}

// Helper type alias for Results
pub type NotaryResult<T> = Result<T, NotaryError>;
