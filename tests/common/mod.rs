//! Shared fixtures: a recording transport, a recording observer, and a peer
//! endpoint speaking the wire format from the far side.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chefwire::{
    make_package, read_package, CloseCode, ConnectionState, KeyManager, Message, SessionObserver,
    Transport,
};

/// Route test logs through tracing; `RUST_LOG=debug` shows drop decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Transport double that records everything the session layer hands it.
#[derive(Clone, Default)]
pub struct MockTransport {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub probes: Arc<Mutex<usize>>,
    pub closed: Arc<Mutex<Option<(CloseCode, String)>>>,
}

impl MockTransport {
    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        *self.probes.lock().unwrap()
    }

    pub fn close_reason(&self) -> Option<(CloseCode, String)> {
        self.closed.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send_text(&mut self, frame: String) {
        self.sent.lock().unwrap().push(frame);
    }

    fn send_probe(&mut self) {
        *self.probes.lock().unwrap() += 1;
    }

    fn close(&mut self, code: CloseCode, reason: &str) {
        *self.closed.lock().unwrap() = Some((code, reason.to_string()));
    }
}

/// Observer double collecting every notification.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub states: Arc<Mutex<Vec<ConnectionState>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub chef_responses: Arc<Mutex<Vec<(u64, String)>>>,
}

impl RecordingObserver {
    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn chef_responses(&self) -> Vec<(u64, String)> {
        self.chef_responses.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn connection_status_changed(&self, status: ConnectionState) {
        self.states.lock().unwrap().push(status);
    }

    fn network_error(&self, reason: &str) {
        self.errors.lock().unwrap().push(reason.to_string());
    }

    fn new_chef_response(&self, request_id: u64, text: &str) {
        self.chef_responses
            .lock()
            .unwrap()
            .push((request_id, text.to_string()));
    }
}

/// The remote endpoint: frames outgoing messages and decodes what the
/// session layer transmitted, under its own copy of the session key.
#[derive(Default)]
pub struct Peer {
    keys: KeyManager,
}

impl Peer {
    pub fn with_key(key: &[u8]) -> Self {
        let mut keys = KeyManager::new();
        keys.set_key(key).expect("test key fits");
        Self { keys }
    }

    pub fn install_key(&mut self, key: &[u8]) {
        self.keys.set_key(key).expect("test key fits");
    }

    /// Build a wire frame carrying `message`.
    pub fn frame(&self, message: &Message) -> String {
        let signature = KeyManager::generate_random_key();
        let package = make_package(message, &signature).expect("serializable message");
        let enc_signature = self.keys.encrypt(&signature).expect("encrypt");
        let enc_package = self.keys.encrypt(&package).expect("encrypt");
        format!(
            "{}.{}",
            BASE64.encode(enc_signature),
            BASE64.encode(enc_package)
        )
    }

    /// Build a frame whose package was signed with one signature while a
    /// different one travels alongside it.
    pub fn frame_with_mismatched_signature(&self, message: &Message) -> String {
        let real = KeyManager::generate_random_key();
        let bogus = KeyManager::generate_random_key();
        let package = make_package(message, &real).expect("serializable message");
        let enc_signature = self.keys.encrypt(&bogus).expect("encrypt");
        let enc_package = self.keys.encrypt(&package).expect("encrypt");
        format!(
            "{}.{}",
            BASE64.encode(enc_signature),
            BASE64.encode(enc_package)
        )
    }

    /// Decode a frame the session layer transmitted, or `None` when this
    /// peer's key cannot open it.
    pub fn try_decode(&self, frame: &str) -> Option<Message> {
        let parts: Vec<&str> = frame.split('.').collect();
        if parts.len() != 2 {
            return None;
        }
        let enc_signature = BASE64.decode(parts[0]).ok()?;
        let enc_package = BASE64.decode(parts[1]).ok()?;
        let signature = self.keys.decrypt(&enc_signature).ok()?;
        let package = self.keys.decrypt(&enc_package).ok()?;
        let value = read_package(&package, &signature).ok()?;
        serde_json::from_value(value).ok()
    }

    pub fn decode(&self, frame: &str) -> Message {
        self.try_decode(frame).expect("frame should decode")
    }
}
