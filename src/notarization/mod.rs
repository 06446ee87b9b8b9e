pub mod engine;
pub mod record;
pub mod submission;

pub use engine::{NotarizationEngine, NotarizeInput, ProofBundle};
pub use record::{
    CostBreakdown, EvidenceLevel, FailureReason, NotarizationRecord, RecordFailure, RecordStatus,
};
pub use submission::{Submission, SubmissionMetadata};
