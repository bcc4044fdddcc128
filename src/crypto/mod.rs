//! Cryptographic core: session keys, the session cipher, and signed packages.
//!
//! Two layers protect every frame on the wire:
//!
//! 1. **Signed package** — the serialized message is bound to a fresh random
//!    16-byte signature with HMAC-SHA256 ([`make_package`] / [`read_package`]).
//! 2. **Session cipher** — both the package and the signature are then
//!    encrypted independently under the current session key with AES-128-GCM
//!    ([`KeyManager::encrypt`] / [`KeyManager::decrypt`]).
//!
//! # Key lifecycle
//!
//! ```text
//! connect ──► default key (all zero)
//!                 │ handshake (peer-supplied 16-byte key)
//!                 ▼
//!             session key ──► disconnect ──► default key
//! ```
//!
//! The handshake acknowledgement is the last message sealed under the old
//! key; everything after it uses the newly installed key.
//!
//! # Sealed layout
//!
//! | Piece | Layout |
//! |---|---|
//! | Package | `message-json \|\| hmac-tag:32` |
//! | Sealed bytes | `nonce:12 \|\| ciphertext \|\| tag:16` |

mod error;
mod key;
mod package;

pub use error::CryptoError;
pub use key::KeyManager;
pub use package::{make_package, read_package};

/// Fixed session-key length in bytes.
pub const KEY_SIZE: usize = 16;

/// Per-message signature length in bytes.
pub const SIGNATURE_SIZE: usize = 16;

/// AES-GCM nonce size (96 bits).
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// HMAC-SHA256 tag size (256 bits).
pub const HMAC_TAG_SIZE: usize = 32;

/// The well-known default session key, in effect outside a handshaken session.
pub const DEFAULT_KEY: [u8; KEY_SIZE] = [0u8; KEY_SIZE];
