use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::canonical::ContentEnvelope;

/// Fixed-length cryptographic digest of canonicalized (content, metadata).
///
/// The digest is the primary identity of submitted content: identical
/// (content, metadata) pairs always produce the identical digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    pub algorithm: String,
    pub value: String,
}

impl ContentDigest {
    /// Calculate SHA-256 over raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let hash = hasher.finalize();

        Self {
            algorithm: "SHA-256".to_string(),
            value: hex::encode(hash),
        }
    }

    /// Digest of a content envelope (canonical content + metadata bytes)
    pub fn from_envelope(envelope: &ContentEnvelope) -> Self {
        Self::from_bytes(&envelope.canonical_bytes())
    }

    /// Check whether the given bytes hash to this digest
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::from_bytes(data).value == self.value
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm.to_lowercase(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_from_bytes() {
        let digest = ContentDigest::from_bytes(b"test data");
        assert_eq!(digest.algorithm, "SHA-256");
        assert_eq!(digest.value.len(), 64);
        assert!(digest.value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_determinism() {
        let env = ContentEnvelope::new(b"test data".to_vec(), json!({"title": "t"}));
        let d1 = ContentDigest::from_envelope(&env);
        let d2 = ContentDigest::from_envelope(&env);
        assert_eq!(d1.value, d2.value);
    }

    #[test]
    fn test_digest_known_vector() {
        // SHA-256 of the empty string
        let digest = ContentDigest::from_bytes(b"");
        assert_eq!(
            digest.value,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_different_content_different_digests() {
        let d1 = ContentDigest::from_bytes(b"data1");
        let d2 = ContentDigest::from_bytes(b"data2");
        assert_ne!(d1.value, d2.value);
    }

    #[test]
    fn test_metadata_participates_in_digest() {
        let a = ContentEnvelope::new(b"same".to_vec(), json!({"title": "a"}));
        let b = ContentEnvelope::new(b"same".to_vec(), json!({"title": "b"}));
        assert_ne!(
            ContentDigest::from_envelope(&a).value,
            ContentDigest::from_envelope(&b).value
        );
    }

    #[test]
    fn test_matches() {
        let digest = ContentDigest::from_bytes(b"payload");
        assert!(digest.matches(b"payload"));
        assert!(!digest.matches(b"Payload"));
    }

    #[test]
    fn test_digest_serialization() {
        let digest = ContentDigest::from_bytes(b"x");
        let json = serde_json::to_string(&digest).unwrap();
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
