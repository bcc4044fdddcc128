//! Session orchestration.
//!
//! [`SessionController`] is the synchronous heart of the crate: it owns the
//! connection state machine, drives the handshake, frames and authenticates
//! every message, and dispatches incoming commands. [`SessionDriver`] wraps
//! a controller in a tokio event loop that owns the heartbeat timer and the
//! liveness deadline, serializing every touch of session state onto one
//! task.
//!
//! ## Send path
//!
//! ```text
//! message ─► random signature ─► package (HMAC-bound)
//!     enc(signature) "." enc(package) ─► transport
//! ```
//!
//! ## Receive path
//!
//! ```text
//! frame ─► split "." ─► decrypt both ─► authenticate ─► validate ─► dispatch
//! ```
//!
//! ## Drop policy
//!
//! | Failure | Policy |
//! |---|---|
//! | Malformed frame (delimiter count ≠ 1) | drop, log, no reply |
//! | Undecodable / undecryptable half | drop, log, no reply |
//! | Package authentication failure | drop silently, no reason disclosed |
//! | Unknown or duplicate response id, bad shape | drop, log |
//! | Handshake shape violation | fatal: close transport with code + reason |
//! | Missed liveness deadline | non-fatal `network_error` notification |

mod controller;
mod driver;

pub use controller::{SessionController, SessionObserver};
pub use driver::{SessionDriver, SessionHandle};
