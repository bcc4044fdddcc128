//! Chefwire error types.
//!
//! The `Crypto` variant preserves the full error chain via `#[source]`,
//! enabling debugging tools to display complete error context.

use thiserror::Error;

use crate::crypto::CryptoError;

/// Chefwire session-layer errors.
#[derive(Error, Debug)]
pub enum ChefwireError {
    /// Operation requires a connected transport.
    #[error("Session not connected")]
    NotConnected,

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Transport or driver communication error.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Cryptographic operation failed.
    ///
    /// This variant preserves the full error chain via `#[source]`.
    #[error("Crypto error: {0}")]
    Crypto(#[source] CryptoError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Chefwire operations
pub type Result<T> = std::result::Result<T, ChefwireError>;

impl From<CryptoError> for ChefwireError {
    fn from(err: CryptoError) -> Self {
        ChefwireError::Crypto(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_error_conversion() {
        let crypto_err = CryptoError::AuthenticationFailed;
        let err: ChefwireError = crypto_err.into();
        assert!(matches!(err, ChefwireError::Crypto(_)));
        assert!(err.to_string().contains("Crypto"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err: ChefwireError = CryptoError::Decrypt("tag mismatch".to_string()).into();

        let source = err.source();
        assert!(source.is_some());
        assert!(source.unwrap().to_string().contains("tag mismatch"));
    }
}
