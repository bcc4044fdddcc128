//! Session key lifecycle and AES-128-GCM encryption.
//!
//! The key manager owns the single live session key. A fresh connection
//! starts on the well-known all-zero default key; the in-band handshake
//! replaces it exactly once, and every disconnect resets it.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{CryptoError, DEFAULT_KEY, KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// Minimum ciphertext size (nonce + tag).
const MIN_CIPHERTEXT_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Owns the current session key and applies the session cipher.
///
/// Encryption output carries its own nonce (`nonce || ciphertext || tag`),
/// so the public contract stays bytes-in / bytes-out and identical
/// plaintexts never produce identical ciphertexts.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyManager {
    /// The current session key.
    key: [u8; KEY_SIZE],
}

impl KeyManager {
    /// Create a key manager holding the default (all-zero) session key.
    pub fn new() -> Self {
        Self { key: DEFAULT_KEY }
    }

    /// Generate a fresh cryptographically strong 16-byte value.
    ///
    /// Used both as the per-message package signature and, when the peer
    /// chooses to hand one back through the handshake, as a future session
    /// key.
    pub fn generate_random_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    /// Generate a key derived from the current wall-clock time.
    ///
    /// **WARNING**: Not cryptographically strong — the whole value is
    /// predictable from the timestamp. Kept only as an explicitly named
    /// insecure source for tooling and tests; no default code path selects
    /// it.
    pub fn generate_timestamp_key() -> [u8; KEY_SIZE] {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut key = [0u8; KEY_SIZE];
        key[..8].copy_from_slice(&millis.to_le_bytes());
        key[8..].copy_from_slice(&millis.to_be_bytes());
        key
    }

    /// Adopt `bytes` as the current session key.
    ///
    /// Input shorter than the fixed key length is zero-padded on the right;
    /// longer input is refused with [`CryptoError::KeyTooLong`].
    pub fn set_key(&mut self, bytes: &[u8]) -> Result<(), CryptoError> {
        if bytes.len() > KEY_SIZE {
            return Err(CryptoError::KeyTooLong {
                len: bytes.len(),
                max: KEY_SIZE,
            });
        }

        let mut key = [0u8; KEY_SIZE];
        key[..bytes.len()].copy_from_slice(bytes);
        self.key = key;
        Ok(())
    }

    /// Restore the default key. Called on every disconnect.
    pub fn reset_key(&mut self) {
        self.key = DEFAULT_KEY;
    }

    /// Encrypt `plaintext` under the current session key.
    ///
    /// Output layout:
    /// ```text
    /// [nonce: 12 bytes][ciphertext + tag: len + 16 bytes]
    /// ```
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.cipher();

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::Encrypt("AEAD encryption failed".to_string()))?;

        let mut output = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);

        Ok(output)
    }

    /// Decrypt data produced by [`encrypt`](Self::encrypt) under the same key.
    ///
    /// Truncated, corrupted, or wrong-key input fails with
    /// [`CryptoError::Decrypt`] rather than returning garbage.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if data.len() < MIN_CIPHERTEXT_SIZE {
            return Err(CryptoError::Decrypt(format!(
                "ciphertext too short: {} bytes (minimum {})",
                data.len(),
                MIN_CIPHERTEXT_SIZE
            )));
        }

        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        let ciphertext = &data[NONCE_SIZE..];

        self.cipher()
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Decrypt("tag mismatch or corrupted ciphertext".to_string()))
    }

    fn cipher(&self) -> Aes128Gcm {
        Aes128Gcm::new_from_slice(&self.key).expect("valid key size")
    }
}

impl Default for KeyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't leak key material in debug output
        write!(f, "KeyManager([REDACTED, {} bytes])", self.key.len())
    }
}
