//! Authentication module: API key and admin session extractors.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

pub use extractor::{AdminAuth, ApiKeyAuth};

/// Wrapper type for the bootstrap admin key.
/// Uses `SecretString` to prevent accidental logging and zeroize on drop.
///
/// # Security features
/// - `Debug` prints `[REDACTED]` instead of the actual value
/// - Memory is zeroed when dropped (via `zeroize`)
/// - Explicit `.expose_secret()` required to access the value
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    /// Create a new AdminKey from an optional string.
    pub fn new(key: Option<String>) -> Self {
        Self(key.map(SecretString::from))
    }

    /// Securely compare the provided key with the stored admin key.
    ///
    /// `subtle::ConstantTimeEq` compares both buffers in full regardless of
    /// where they first differ, and returns false for unequal lengths
    /// without an early exit.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(secret) => {
                let expected = secret.expose_secret();
                expected.as_bytes().ct_eq(provided.as_bytes()).into()
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches() {
        let key = AdminKey::new(Some("bootstrap".to_string()));
        assert!(key.verify("bootstrap"));
        assert!(!key.verify("bootstrap2"));
        assert!(!key.verify(""));
    }

    #[test]
    fn test_unset_key_never_verifies() {
        let key = AdminKey::new(None);
        assert!(!key.verify(""));
        assert!(!key.verify("anything"));
    }

    #[test]
    fn test_debug_redacts() {
        let key = AdminKey::new(Some("bootstrap".to_string()));
        assert_eq!(format!("{:?}", key), "AdminKey([REDACTED])");
    }
}
