use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::OrderDigest;

/// Compact signature layout: 64 bytes r||s plus one recovery byte.
pub const SIGNATURE_LEN: usize = 65;

/// Errors from signature recovery and signing helpers.
#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("missing signature")]
    MissingSignature,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryByte(u8),

    #[error("signature recovery failed")]
    RecoveryFailed,

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Capability for recovering a signer identity from a digest signature.
///
/// Injected so the matcher's state machine can be exercised without a
/// real cryptographic backend.
pub trait SignatureVerifier: Send + Sync {
    fn recover(&self, digest: &OrderDigest, signature: &[u8]) -> Result<String, SignatureError>;
}

/// Production verifier: recoverable ECDSA over secp256k1.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Verifier;

impl SignatureVerifier for Secp256k1Verifier {
    fn recover(&self, digest: &OrderDigest, signature: &[u8]) -> Result<String, SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::MissingSignature);
        }
        if signature.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                signature.len()
            )));
        }

        let sig = Signature::from_slice(&signature[..64])
            .map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(signature[64])
            .ok_or(SignatureError::InvalidRecoveryByte(signature[64]))?;

        let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &sig, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;

        Ok(party_id_from_key(&key))
    }
}

/// Derive the opaque party identity for a public key: hex of the
/// trailing 20 bytes of Sha256 over the compressed SEC1 encoding.
pub fn party_id_from_key(key: &VerifyingKey) -> String {
    let hash = Sha256::digest(key.to_sec1_bytes());
    hex::encode(&hash[12..])
}

/// Sign an order digest with a raw 32-byte private key, producing the
/// 65-byte recoverable signature. Client-side and test helper; the core
/// never holds private keys.
pub fn sign_digest(digest: &OrderDigest, private_key: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let signing_key = SigningKey::from_slice(private_key)
        .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;

    let (sig, recovery_id) = signing_key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;

    let mut out = Vec::with_capacity(SIGNATURE_LEN);
    out.extend_from_slice(&sig.to_bytes());
    out.push(recovery_id.to_byte());
    Ok(out)
}

/// Derive the party identity controlled by a raw private key.
pub fn party_id_from_private_key(private_key: &[u8]) -> Result<String, SignatureError> {
    let signing_key = SigningKey::from_slice(private_key)
        .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;
    Ok(party_id_from_key(signing_key.verifying_key()))
}
