use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::{NotaryError, NotaryResult};

/// A detached signature plus everything needed to verify it independently
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub algorithm: String,
    pub public_key: String,
    pub signature: String,
    pub signed_data_hash: String,
}

/// The issuing authority's Ed25519 keypair.
///
/// Ed25519 signing is deterministic: the same key and message always produce
/// the same signature, so certificate signatures are reproducible. The key is
/// passed in through configuration, never read from ambient state.
pub struct IssuerKey {
    signing_key: SigningKey,
}

impl IssuerKey {
    /// Generate a new Ed25519 keypair
    pub fn generate() -> Self {
        let signing_key = SigningKey::from_bytes(&rand::random::<[u8; 32]>());
        Self { signing_key }
    }

    /// Load keypair from raw private key bytes
    pub fn from_bytes(bytes: &[u8]) -> NotaryResult<Self> {
        if bytes.len() != 32 {
            return Err(NotaryError::SigningFailed(
                "Invalid key length: expected 32 bytes".to_string(),
            ));
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(bytes);
        let signing_key = SigningKey::from_bytes(&key_bytes);
        Ok(Self { signing_key })
    }

    /// Get the private key bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Get the public key
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Base64-encoded public key, as embedded in proof bundles
    pub fn public_key_b64(&self) -> String {
        general_purpose::STANDARD.encode(self.verifying_key().as_bytes())
    }

    /// Sign data and return a detached SignatureInfo
    pub fn sign(&self, data: &[u8]) -> SignatureInfo {
        let signature = self.signing_key.sign(data);

        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(data);
        let data_hash = hasher.finalize();

        SignatureInfo {
            algorithm: "Ed25519".to_string(),
            public_key: self.public_key_b64(),
            signature: general_purpose::STANDARD.encode(signature.to_bytes()),
            signed_data_hash: format!("sha256:{}", hex::encode(data_hash)),
        }
    }

    /// Verify a signature against a base64-encoded public key
    pub fn verify(public_key_b64: &str, signature_b64: &str, data: &[u8]) -> NotaryResult<bool> {
        let public_key_bytes = general_purpose::STANDARD.decode(public_key_b64)?;
        let signature_bytes = general_purpose::STANDARD.decode(signature_b64)?;

        if public_key_bytes.len() != 32 {
            return Err(NotaryError::VerificationFailed(
                "Invalid public key length".to_string(),
            ));
        }
        if signature_bytes.len() != 64 {
            return Err(NotaryError::VerificationFailed(
                "Invalid signature length".to_string(),
            ));
        }

        let mut pk_array = [0u8; 32];
        pk_array.copy_from_slice(&public_key_bytes);
        let public_key = VerifyingKey::from_bytes(&pk_array)
            .map_err(|e| NotaryError::VerificationFailed(format!("Invalid public key: {}", e)))?;

        let mut sig_array = [0u8; 64];
        sig_array.copy_from_slice(&signature_bytes);
        let signature = Signature::from_bytes(&sig_array);

        Ok(public_key.verify(data, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair() {
        let key = IssuerKey::generate();
        assert_eq!(key.verifying_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_sign_and_verify() {
        let key = IssuerKey::generate();
        let data = b"certificate payload";

        let info = key.sign(data);
        let verified = IssuerKey::verify(&info.public_key, &info.signature, data).unwrap();
        assert!(verified);
    }

    #[test]
    fn test_verify_fails_with_wrong_data() {
        let key = IssuerKey::generate();
        let info = key.sign(b"original");

        let verified = IssuerKey::verify(&info.public_key, &info.signature, b"tampered").unwrap();
        assert!(!verified);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = IssuerKey::from_bytes(&[7u8; 32]).unwrap();
        let s1 = key.sign(b"same input");
        let s2 = key.sign(b"same input");
        assert_eq!(s1.signature, s2.signature);
        assert_eq!(s1.signed_data_hash, s2.signed_data_hash);
    }

    #[test]
    fn test_key_roundtrip() {
        let key = IssuerKey::generate();
        let restored = IssuerKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(key.public_key_b64(), restored.public_key_b64());
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        assert!(IssuerKey::from_bytes(&[0u8; 16]).is_err());
    }
}
