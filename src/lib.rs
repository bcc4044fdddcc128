//! # Chefwire - Client-Side Secure Session Layer
//!
//! Chefwire bootstraps a shared symmetric key with a remote peer through an
//! in-band handshake, then authenticates and encrypts every structured
//! message on a persistent bidirectional text transport, while watching
//! transport liveness with a probe/deadline pair.
//!
//! ## Features
//!
//! - **Signed packages**: every message is bound to a fresh random signature
//!   with HMAC-SHA256 before encryption
//! - **AES-128-GCM session cipher**: per-message random nonce carried inside
//!   the sealed bytes; identical plaintexts never repeat on the wire
//! - **Key lifecycle**: default key → handshake-installed key → reset on
//!   every disconnect
//! - **Request correlation**: monotonic per-session ids with exactly-once
//!   response resolution
//! - **Liveness detection**: heartbeat probes with a one-shot reply deadline
//!
//! ## Protocol Overview
//!
//! ```text
//! Client                                  Server
//!    |                                       |
//!    |<------ handshake request (key) ------|  sealed under default key
//!    |------- handshake response true ----->|  still under the old key
//!    |                                       |  both switch to the new key
//!    |====== encrypted signed frames =======|
//!    |                                       |
//!    |------- liveness probe -------------->|
//!    |<------ liveness reply ---------------|
//! ```
//!
//! ### Wire Frame
//!
//! One text message per protocol message:
//!
//! ```text
//! base64(enc(signature)) "." base64(enc(package))
//! ```
//!
//! Exactly one delimiter; both halves non-empty. The package binds the
//! serialized message to the signature, and both halves are sealed
//! independently under the current session key.
//!
//! ### State Machine
//!
//! | State | Entered on | Side effects |
//! |---|---|---|
//! | `Connecting` | transport dialing | none |
//! | `Connected` | transport open | heartbeat starts |
//! | `Closing` | graceful shutdown | none |
//! | `Disconnected` | transport gone | key reset, correlator reset, heartbeat stops |
//!
//! Every transition publishes a `connection_status_changed` notification.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chefwire::{Config, SessionController, SessionDriver, TransportEvent};
//! use tokio::sync::mpsc;
//!
//! let (events_tx, events_rx) = mpsc::unbounded_channel();
//! let transport = MyWebSocket::connect(events_tx)?;
//!
//! let mut controller = SessionController::new(transport);
//! controller.subscribe(Box::new(MyObserver));
//!
//! let driver = SessionDriver::new(controller, events_rx, Config::load().session);
//! let handle = driver.handle();
//! tokio::spawn(driver.run());
//!
//! // After the server's handshake lands:
//! let id = handle.send_request("new_chef", serde_json::json!("sushi")).await?;
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: session keys, the session cipher, signed packages
//! - [`protocol`]: message envelope and request/response correlation
//! - [`session`]: controller state machine and async driver
//! - [`transport`]: the contract an external transport implements
//! - [`config`]: configuration management
//! - [`error`]: error types and result alias
//!
//! ## Scope
//!
//! Reconnection policy, per-request timeouts, and transport-level retry are
//! deliberately the caller's responsibility; the session layer reports
//! `network_error` and resets cleanly, nothing more.

pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use config::{Config, SessionConfig};
pub use crypto::{make_package, read_package, CryptoError, KeyManager};
pub use error::{ChefwireError, Result};
pub use protocol::{Message, MessageCorrelator, MessageKind, ValidationError, INITIAL_REQUEST_ID};
pub use session::{SessionController, SessionDriver, SessionHandle, SessionObserver};
pub use transport::{CloseCode, ConnectionState, Transport, TransportEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Chefwire protocol version
pub const PROTOCOL_VERSION: &str = "1.0";
