//! Signed-package framing.
//!
//! A package binds one serialized message to a per-message random signature:
//! the signature keys an HMAC-SHA256 tag appended to the payload, so altering
//! either the payload or the signature is detectable.
//!
//! ```text
//! [serialized message: variable][hmac tag: 32 bytes]
//! ```
//!
//! A package is meaningless on its own; it only verifies against the
//! signature transmitted (encrypted) alongside it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{CryptoError, HMAC_TAG_SIZE, SIGNATURE_SIZE};
use crate::protocol::Message;

type HmacSha256 = Hmac<Sha256>;

/// Serialize `message` and bind it to `signature`.
pub fn make_package(
    message: &Message,
    signature: &[u8; SIGNATURE_SIZE],
) -> Result<Vec<u8>, serde_json::Error> {
    let payload = serde_json::to_vec(message)?;

    let mut mac = HmacSha256::new_from_slice(signature).expect("HMAC accepts any key size");
    mac.update(&payload);
    let tag = mac.finalize().into_bytes();

    let mut package = Vec::with_capacity(payload.len() + HMAC_TAG_SIZE);
    package.extend_from_slice(&payload);
    package.extend_from_slice(&tag);

    Ok(package)
}

/// Verify `package` against `expected_signature` and recover the message.
///
/// Returns the decoded structured value so shape validation stays a separate
/// step. Every failure mode — truncated buffer, tag mismatch, wrong-length
/// signature, malformed payload — yields the single opaque
/// [`CryptoError::AuthenticationFailed`] outcome.
pub fn read_package(
    package: &[u8],
    expected_signature: &[u8],
) -> Result<serde_json::Value, CryptoError> {
    if expected_signature.len() != SIGNATURE_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }
    if package.len() < HMAC_TAG_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }

    let (payload, tag) = package.split_at(package.len() - HMAC_TAG_SIZE);

    let mut mac =
        HmacSha256::new_from_slice(expected_signature).expect("HMAC accepts any key size");
    mac.update(payload);
    if mac.verify_slice(tag).is_err() {
        return Err(CryptoError::AuthenticationFailed);
    }

    serde_json::from_slice(payload).map_err(|_| CryptoError::AuthenticationFailed)
}
