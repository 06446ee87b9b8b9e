pub mod canonical;
pub mod hash;
pub mod signature;

pub use canonical::{canonical_json, ContentEnvelope};
pub use hash::ContentDigest;
pub use signature::{IssuerKey, SignatureInfo};
