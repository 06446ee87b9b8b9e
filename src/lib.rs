//! veriseal — content notarization and certificate service.
//!
//! Content is canonicalized and hashed, persisted in a content-addressed
//! store, and anchored in an append-only ledger. Anchored records can be
//! turned into Ed25519-signed certificates, and both records and
//! certificates can be independently re-verified against the live backends.

pub mod anchor;
pub mod certificate;
pub mod config;
pub mod error;
pub mod evidence;
pub mod notarization;
pub mod registry;
pub mod repository;
pub mod server;
pub mod store;
pub mod verification;

pub use certificate::{Certificate, CertificateIssuer, CertificateStatus, LegalWeight};
pub use config::NotaryConfig;
pub use error::{NotaryError, NotaryResult};
pub use notarization::{
    EvidenceLevel, NotarizationEngine, NotarizationRecord, NotarizeInput, RecordStatus,
};
pub use registry::CertificateRegistry;
pub use verification::{CheckResult, VerificationService, VerificationVerdict};
