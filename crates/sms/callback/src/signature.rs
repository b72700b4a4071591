//! SHA-1 callback signature generation and verification.

use pushsms_core::Credentials;
use sha1::{Digest, Sha1};

/// Computes the lowercase hex signature the vendor attaches to a callback.
///
/// The digest covers `appKey=..&appMasterSecret=..&nonce=..&timestamp=..`.
pub fn sign(app_key: &str, secret: &str, nonce: &str, timestamp: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(b"appKey=");
    hasher.update(app_key.as_bytes());
    hasher.update(b"&appMasterSecret=");
    hasher.update(secret.as_bytes());
    hasher.update(b"&nonce=");
    hasher.update(nonce.as_bytes());
    hasher.update(b"&timestamp=");
    hasher.update(timestamp.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true iff `signature` is the exact signature of the parameters.
pub fn verify(app_key: &str, secret: &str, nonce: &str, timestamp: &str, signature: &str) -> bool {
    let expected = sign(app_key, secret, nonce, timestamp);
    constant_time_compare(&expected, signature)
}

/// Verifier bound to one credential pair.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    credentials: Credentials,
}

impl SignatureVerifier {
    /// Creates a verifier for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Computes the expected signature for a nonce/timestamp pair.
    pub fn sign(&self, nonce: &str, timestamp: &str) -> String {
        sign(
            self.credentials.app_key(),
            self.credentials.app_master_secret(),
            nonce,
            timestamp,
        )
    }

    /// Verifies a callback signature.
    ///
    /// Missing parameters are rejected outright.
    pub fn verify(&self, nonce: &str, timestamp: &str, signature: &str) -> bool {
        if nonce.is_empty() || timestamp.is_empty() || signature.is_empty() {
            return false;
        }
        constant_time_compare(&self.sign(nonce, timestamp), signature)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
