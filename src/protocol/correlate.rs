//! Request/response correlation.
//!
//! Issues monotonic ids for outgoing requests, tracks which of them still
//! await a response, and validates incoming structured values before they
//! reach command dispatch.
//!
//! Individual requests carry no timeout: only the connection-wide liveness
//! check can detect an unresponsive peer. A request whose response never
//! arrives stays pending until the next disconnect clears the set.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use super::message::{Message, MessageKind};
use super::INITIAL_REQUEST_ID;

/// Reasons an incoming message is rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or has the wrong type.
    #[error("missing or malformed field: {0}")]
    InvalidField(&'static str),

    /// A response id that matches no outstanding request.
    ///
    /// Covers both never-issued ids and ids already resolved once.
    #[error("response id {0} matches no pending request")]
    UnknownResponse(u64),
}

/// Correlates outgoing requests with incoming responses.
#[derive(Debug)]
pub struct MessageCorrelator {
    /// Next id to issue.
    next_id: u64,
    /// Ids of self-originated requests still awaiting a response.
    pending: HashSet<u64>,
}

impl MessageCorrelator {
    /// Create a correlator with a fresh id sequence.
    pub fn new() -> Self {
        Self {
            next_id: INITIAL_REQUEST_ID,
            pending: HashSet::new(),
        }
    }

    /// Build a request under the next id and record it as pending.
    pub fn make_request(&mut self, cmd: impl Into<String>, data: Value) -> Message {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id);
        Message::request(cmd, id, data)
    }

    /// Build a response to a peer-issued request.
    ///
    /// Copies the request's command and id; the pending set is untouched
    /// because the request was not self-originated.
    pub fn make_response(&self, request: &Message, data: Value) -> Message {
        Message::response(request.cmd.clone(), request.id, data)
    }

    /// Validate an incoming structured value into a [`Message`].
    ///
    /// Requests are accepted unconditionally (peer-initiated). A response
    /// must match an outstanding request id, and matching removes the id so
    /// every request resolves at most once.
    pub fn validate_incoming(&mut self, candidate: &Value) -> Result<Message, ValidationError> {
        let object = candidate
            .as_object()
            .ok_or(ValidationError::InvalidField("message"))?;

        let cmd = object
            .get("cmd")
            .and_then(Value::as_str)
            .ok_or(ValidationError::InvalidField("cmd"))?;

        let typ = match object.get("typ").and_then(Value::as_str) {
            Some("request") => MessageKind::Request,
            Some("response") => MessageKind::Response,
            _ => return Err(ValidationError::InvalidField("typ")),
        };

        let id = object
            .get("id")
            .and_then(Value::as_u64)
            .ok_or(ValidationError::InvalidField("id"))?;

        let data = object
            .get("data")
            .cloned()
            .ok_or(ValidationError::InvalidField("data"))?;

        if typ == MessageKind::Response && !self.pending.remove(&id) {
            return Err(ValidationError::UnknownResponse(id));
        }

        Ok(Message {
            cmd: cmd.to_owned(),
            typ,
            id,
            data,
        })
    }

    /// Number of requests still awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check whether `id` awaits a response.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains(&id)
    }

    /// Clear all bookkeeping and restart id numbering; invoked on disconnect.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.next_id = INITIAL_REQUEST_ID;
    }
}

impl Default for MessageCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
