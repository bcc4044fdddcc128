//! Unified cryptographic error type for the session layer.
//!
//! Every crypto failure surfaces through [`CryptoError`], which the crate
//! error wraps with `#[source]` so the full chain stays visible to callers.
//!
//! [`CryptoError::AuthenticationFailed`] is deliberately opaque: package
//! verification collapses every failure mode (short buffer, bad tag,
//! malformed payload) into the same variant so an observer cannot learn
//! *why* a frame was refused.

use thiserror::Error;

/// Errors from key management, encryption, and package authentication.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material longer than the fixed session-key length.
    ///
    /// Short input is zero-padded instead; only over-length input is refused.
    #[error("key too long: {len} bytes (maximum {max})")]
    KeyTooLong {
        /// Length of the rejected input.
        len: usize,
        /// The fixed session-key length.
        max: usize,
    },

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Decryption failed (truncated, corrupted, or sealed under another key).
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// Package verification failed. Carries no detail on purpose.
    #[error("package authentication failed")]
    AuthenticationFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_too_long_display() {
        let err = CryptoError::KeyTooLong { len: 24, max: 16 };
        assert!(err.to_string().contains("24"));
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn test_authentication_failed_is_opaque() {
        let err = CryptoError::AuthenticationFailed;
        assert_eq!(err.to_string(), "package authentication failed");
    }
}
