//! Message model and request/response correlation.
//!
//! Every structured message travels as a JSON object:
//!
//! ```json
//! {"cmd": "<command>", "typ": "request" | "response", "id": <integer>, "data": <value>}
//! ```
//!
//! A response reuses the originating request's `id`; the correlator
//! guarantees each self-issued request resolves at most once.
//!
//! ## Commands
//!
//! | Command | Direction | Shape | Handling |
//! |---|---|---|---|
//! | `handshake` | peer → client | request, string key | fatal close on violation; ack `true`, install key |
//! | `new_chef` | peer → client | response, string text | lenient; notifies observers |
//! | anything else | — | — | ignored (extensibility point) |

mod correlate;
mod message;

pub use correlate::{MessageCorrelator, ValidationError};
pub use message::{Message, MessageKind};

/// First request id issued per session; numbering restarts here on reset.
pub const INITIAL_REQUEST_ID: u64 = 1;

/// In-band handshake command installing the next session key.
pub const CMD_HANDSHAKE: &str = "handshake";

/// Application data delivery command.
pub const CMD_NEW_CHEF: &str = "new_chef";

/// Delimiter joining the two encrypted halves of a wire frame.
///
/// The halves are Base64 text, so the delimiter cannot occur inside them.
pub const FRAME_DELIMITER: char = '.';
