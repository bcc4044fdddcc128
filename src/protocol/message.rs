//! Wire message envelope.
//!
//! Defines the structured message exchanged after frame decryption:
//!
//! ```json
//! {"cmd": "handshake", "typ": "request", "id": 1, "data": "..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message kinds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A request expecting a correlated response.
    Request,
    /// A response carrying the id of the request it answers.
    Response,
}

/// Protocol message envelope.
///
/// For a [`MessageKind::Response`] the `id` field is the originating
/// request's id; that is the whole correlation mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Command name ("handshake", "new_chef", ...).
    pub cmd: String,
    /// Request or response.
    pub typ: MessageKind,
    /// Correlation id.
    pub id: u64,
    /// Structured payload.
    pub data: Value,
}

impl Message {
    /// Create a request message.
    pub fn request(cmd: impl Into<String>, id: u64, data: Value) -> Self {
        Self {
            cmd: cmd.into(),
            typ: MessageKind::Request,
            id,
            data,
        }
    }

    /// Create a response message.
    pub fn response(cmd: impl Into<String>, id: u64, data: Value) -> Self {
        Self {
            cmd: cmd.into(),
            typ: MessageKind::Response,
            id,
            data,
        }
    }

    /// Check if this is a request.
    pub fn is_request(&self) -> bool {
        self.typ == MessageKind::Request
    }

    /// Check if this is a response.
    pub fn is_response(&self) -> bool {
        self.typ == MessageKind::Response
    }

    /// The payload as text, if it is a string.
    pub fn data_text(&self) -> Option<&str> {
        self.data.as_str()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_constructor() {
        let msg = Message::request("handshake", 1, json!("0123456789ABCDEF"));

        assert_eq!(msg.cmd, "handshake");
        assert!(msg.is_request());
        assert_eq!(msg.id, 1);
        assert_eq!(msg.data_text(), Some("0123456789ABCDEF"));
    }

    #[test]
    fn test_response_constructor() {
        let msg = Message::response("handshake", 7, json!(true));

        assert!(msg.is_response());
        assert_eq!(msg.id, 7);
        assert_eq!(msg.data, json!(true));
        assert!(msg.data_text().is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let msg = Message::request("new_chef", 12, json!({"cuisine": "thai"}));
        let json = msg.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["cmd"], "new_chef");
        assert_eq!(value["typ"], "request");
        assert_eq!(value["id"], 12);
        assert_eq!(value["data"]["cuisine"], "thai");
    }

    #[test]
    fn test_kind_lowercase_on_wire() {
        let req = serde_json::to_string(&MessageKind::Request).unwrap();
        let rsp = serde_json::to_string(&MessageKind::Response).unwrap();

        assert_eq!(req, "\"request\"");
        assert_eq!(rsp, "\"response\"");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let msg = Message::response("new_chef", 42, json!("Auguste Gusteau"));
        let parsed = Message::from_json(&msg.to_json().unwrap()).unwrap();

        assert_eq!(parsed, msg);
    }
}
