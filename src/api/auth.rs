//! Admin authentication.
//!
//! The configured password is reduced to its SHA-256 digest at startup and
//! only the digest is kept. Candidates are hashed the same way and compared
//! with [`subtle::ConstantTimeEq`], so the comparison time depends on neither
//! the content nor the length of the guess.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// The admin secret, injected into handlers through application state.
#[derive(Clone)]
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    pub fn new(password: &str) -> Self {
        Self {
            digest: Sha256::digest(password.as_bytes()).into(),
        }
    }

    /// Check a login attempt against the secret.
    pub fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate.ct_eq(&self.digest).into()
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}
