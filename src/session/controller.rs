//! Session controller: connection state machine, framing, and dispatch.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;

use crate::crypto::{make_package, read_package, KeyManager, KEY_SIZE};
use crate::error::{ChefwireError, Result};
use crate::protocol::{
    Message, MessageCorrelator, MessageKind, CMD_HANDSHAKE, CMD_NEW_CHEF, FRAME_DELIMITER,
};
use crate::transport::{CloseCode, ConnectionState, Transport, TransportEvent};

/// Receives session notifications.
///
/// Callers register observers with [`SessionController::subscribe`]; every
/// method has a no-op default so implementations override only what they
/// consume. Callbacks fire inline on the control thread — implementations
/// must not block.
pub trait SessionObserver: Send {
    /// The connection state changed.
    fn connection_status_changed(&self, _status: ConnectionState) {}

    /// A non-fatal network problem: missed liveness deadline, transport
    /// error, or TLS error. The caller decides whether to reconnect.
    fn network_error(&self, _reason: &str) {}

    /// Application data arrived: the text answering the `new_chef` request
    /// issued under `request_id`.
    fn new_chef_response(&self, _request_id: u64, _text: &str) {}
}

/// Client-side secure session over a text-frame transport.
///
/// Owns the connection state machine, the session key, and the request
/// correlator. All methods are synchronous and must be called from a single
/// logical control thread; the [`SessionDriver`](super::SessionDriver)
/// provides that serialization for async callers.
pub struct SessionController<T: Transport> {
    transport: T,
    keys: KeyManager,
    correlator: MessageCorrelator,
    status: ConnectionState,
    heartbeat_active: bool,
    awaiting_liveness_reply: bool,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl<T: Transport> SessionController<T> {
    /// Create a controller over `transport`, starting disconnected on the
    /// default session key.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            keys: KeyManager::new(),
            correlator: MessageCorrelator::new(),
            status: ConnectionState::Disconnected,
            heartbeat_active: false,
            awaiting_liveness_reply: false,
            observers: Vec::new(),
        }
    }

    /// Register an observer for session notifications.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Current connection state.
    pub fn status(&self) -> ConnectionState {
        self.status
    }

    /// Whether the heartbeat should be ticking.
    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat_active
    }

    /// Whether a liveness probe awaits its reply.
    pub fn liveness_armed(&self) -> bool {
        self.awaiting_liveness_reply
    }

    /// Number of requests still awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    /// Issue a request to the peer; returns the correlation id.
    pub fn send_request(&mut self, cmd: &str, data: Value) -> Result<u64> {
        if self.status != ConnectionState::Connected {
            return Err(ChefwireError::NotConnected);
        }
        let message = self.correlator.make_request(cmd, data);
        let id = message.id;
        self.send(&message)?;
        Ok(id)
    }

    /// Answer a peer-issued request.
    pub fn send_response(&mut self, request: &Message, data: Value) -> Result<()> {
        if self.status != ConnectionState::Connected {
            return Err(ChefwireError::NotConnected);
        }
        let message = self.correlator.make_response(request, data);
        self.send(&message)
    }

    /// Frame, sign, encrypt, and transmit one message.
    fn send(&mut self, message: &Message) -> Result<()> {
        tracing::debug!(cmd = %message.cmd, id = message.id, "sending message");

        let signature = KeyManager::generate_random_key();
        let package = make_package(message, &signature)?;

        let enc_signature = self.keys.encrypt(&signature)?;
        let enc_package = self.keys.encrypt(&package)?;

        let frame = format!(
            "{}{}{}",
            BASE64.encode(enc_signature),
            FRAME_DELIMITER,
            BASE64.encode(enc_package)
        );
        self.transport.send_text(frame);
        Ok(())
    }

    /// Feed one transport event into the state machine.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::StateChanged(state) => self.on_state_changed(state),
            TransportEvent::Text(frame) => self.on_text(&frame),
            TransportEvent::LivenessReply => self.on_liveness_reply(),
            TransportEvent::Error(reason) => self.on_transport_error(&reason),
            TransportEvent::TlsError(reason) => self.on_tls_error(&reason),
        }
    }

    /// One handler per destination state; no shared execution path.
    fn on_state_changed(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Connected => {
                self.heartbeat_active = true;
            }
            ConnectionState::Disconnected => {
                self.keys.reset_key();
                self.correlator.reset();
                self.heartbeat_active = false;
                self.awaiting_liveness_reply = false;
            }
            ConnectionState::Connecting | ConnectionState::Closing => {}
        }

        self.status = state;
        tracing::debug!(%state, "connection state changed");
        for observer in &self.observers {
            observer.connection_status_changed(state);
        }
    }

    /// Split, decrypt, authenticate, validate, and dispatch one frame.
    ///
    /// Every failure before dispatch drops the frame without a reply; see
    /// the module docs for the full drop table.
    fn on_text(&mut self, frame: &str) {
        let parts: Vec<&str> = frame
            .split(FRAME_DELIMITER)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() != 2 {
            tracing::debug!(parts = parts.len(), "malformed frame: expected 2 parts");
            return;
        }

        let (enc_signature, enc_package) = match (BASE64.decode(parts[0]), BASE64.decode(parts[1]))
        {
            (Ok(signature), Ok(package)) => (signature, package),
            _ => {
                tracing::debug!("dropping frame: undecodable text halves");
                return;
            }
        };

        let signature = match self.keys.decrypt(&enc_signature) {
            Ok(signature) => signature,
            Err(err) => {
                tracing::debug!("dropping frame: {err}");
                return;
            }
        };
        let package = match self.keys.decrypt(&enc_package) {
            Ok(package) => package,
            Err(err) => {
                tracing::debug!("dropping frame: {err}");
                return;
            }
        };

        let candidate = match read_package(&package, &signature) {
            Ok(candidate) => candidate,
            Err(_) => {
                tracing::debug!("dropping unauthenticated frame");
                return;
            }
        };

        let message = match self.correlator.validate_incoming(&candidate) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!("rejected message: {err}");
                return;
            }
        };

        tracing::debug!(cmd = %message.cmd, id = message.id, "received message");
        self.dispatch(&message);
    }

    fn dispatch(&mut self, message: &Message) {
        match message.cmd.as_str() {
            CMD_HANDSHAKE => self.process_handshake(message),
            CMD_NEW_CHEF => self.process_new_chef(message),
            other => tracing::debug!(cmd = other, "ignoring unrecognized command"),
        }
    }

    /// Install the peer-supplied session key.
    ///
    /// Shape violations are fatal: the transport is closed with a
    /// wrong-datatype code and no reply is sent.
    fn process_handshake(&mut self, message: &Message) {
        if message.typ != MessageKind::Request {
            self.transport
                .close(CloseCode::UnsupportedData, "handshake is not a request");
            return;
        }
        let Some(key_text) = message.data_text() else {
            self.transport
                .close(CloseCode::UnsupportedData, "handshake key is not a string");
            return;
        };
        if key_text.len() > KEY_SIZE {
            self.transport.close(
                CloseCode::UnsupportedData,
                "handshake key exceeds the fixed key length",
            );
            return;
        }

        // The ack goes out under the key the peer can still decrypt; only
        // then is the new key installed.
        if let Err(err) = self.send_response(message, Value::Bool(true)) {
            tracing::warn!("failed to acknowledge handshake: {err}");
            return;
        }
        if let Err(err) = self.keys.set_key(key_text.as_bytes()) {
            tracing::warn!("failed to install session key: {err}");
            return;
        }
        tracing::info!("handshake complete, session key installed");
    }

    /// Deliver application data to observers.
    ///
    /// Shape mismatches are logged but handling continues leniently.
    fn process_new_chef(&mut self, message: &Message) {
        if message.typ != MessageKind::Response {
            tracing::warn!("new_chef arrived as a request");
        }
        if !message.data.is_string() {
            tracing::warn!("new_chef payload is not a string");
        }

        let text = message.data_text().unwrap_or_default();
        for observer in &self.observers {
            observer.new_chef_response(message.id, text);
        }
    }

    /// Heartbeat tick: probe the peer and arm the liveness deadline.
    pub fn on_heartbeat_tick(&mut self) {
        if !self.heartbeat_active {
            return;
        }
        self.transport.send_probe();
        self.awaiting_liveness_reply = true;
    }

    fn on_liveness_reply(&mut self) {
        self.awaiting_liveness_reply = false;
    }

    /// Liveness deadline expired without a reply.
    ///
    /// Fires at most one notification per missed probe cycle; non-fatal,
    /// the caller decides whether to reconnect.
    pub fn on_liveness_deadline(&mut self) {
        if !self.awaiting_liveness_reply {
            return;
        }
        self.awaiting_liveness_reply = false;
        tracing::warn!("liveness deadline expired without a reply");
        self.notify_network_error("liveness deadline expired");
    }

    fn on_transport_error(&mut self, reason: &str) {
        tracing::warn!(reason, "transport error");
        self.notify_network_error(reason);
    }

    fn on_tls_error(&mut self, reason: &str) {
        tracing::warn!(reason, "tls error");
        self.notify_network_error(reason);
    }

    fn notify_network_error(&self, reason: &str) {
        for observer in &self.observers {
            observer.network_error(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct NullTransport {
        probes: Arc<Mutex<usize>>,
    }

    impl Transport for NullTransport {
        fn send_text(&mut self, _frame: String) {}
        fn send_probe(&mut self) {
            *self.probes.lock().unwrap() += 1;
        }
        fn close(&mut self, _code: CloseCode, _reason: &str) {}
    }

    #[derive(Clone, Default)]
    struct StatusLog {
        states: Arc<Mutex<Vec<ConnectionState>>>,
    }

    impl SessionObserver for StatusLog {
        fn connection_status_changed(&self, status: ConnectionState) {
            self.states.lock().unwrap().push(status);
        }
    }

    #[test]
    fn test_every_transition_is_published() {
        let log = StatusLog::default();
        let mut controller = SessionController::new(NullTransport::default());
        controller.subscribe(Box::new(log.clone()));

        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connecting));
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Closing));
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Disconnected));

        assert_eq!(
            *log.states.lock().unwrap(),
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Closing,
                ConnectionState::Disconnected,
            ]
        );
    }

    #[test]
    fn test_connected_starts_heartbeat_without_resetting() {
        let mut controller = SessionController::new(NullTransport::default());
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));
        let id = controller.send_request("order", serde_json::json!(null)).unwrap();

        // A second Connected transition must not fall through into the
        // disconnect resets
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));

        assert!(controller.heartbeat_active());
        assert_eq!(controller.pending_requests(), 1);
        assert!(controller.correlator.is_pending(id));
    }

    #[test]
    fn test_disconnected_resets_session_state() {
        let mut controller = SessionController::new(NullTransport::default());
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));
        controller.send_request("order", serde_json::json!(null)).unwrap();
        controller.on_heartbeat_tick();
        assert!(controller.liveness_armed());

        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Disconnected));

        assert!(!controller.heartbeat_active());
        assert!(!controller.liveness_armed());
        assert_eq!(controller.pending_requests(), 0);
    }

    #[test]
    fn test_send_requires_connected() {
        let mut controller = SessionController::new(NullTransport::default());

        let result = controller.send_request("order", serde_json::json!(null));

        assert!(matches!(result, Err(ChefwireError::NotConnected)));
    }

    #[test]
    fn test_heartbeat_tick_probes_only_while_active() {
        let transport = NullTransport::default();
        let mut controller = SessionController::new(transport.clone());

        controller.on_heartbeat_tick();
        assert_eq!(*transport.probes.lock().unwrap(), 0);

        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));
        controller.on_heartbeat_tick();
        assert_eq!(*transport.probes.lock().unwrap(), 1);
    }

    #[test]
    fn test_deadline_fires_once_per_missed_cycle() {
        #[derive(Clone, Default)]
        struct ErrorCount {
            count: Arc<Mutex<usize>>,
        }
        impl SessionObserver for ErrorCount {
            fn network_error(&self, _reason: &str) {
                *self.count.lock().unwrap() += 1;
            }
        }

        let errors = ErrorCount::default();
        let mut controller = SessionController::new(NullTransport::default());
        controller.subscribe(Box::new(errors.clone()));
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));

        controller.on_heartbeat_tick();
        controller.on_liveness_deadline();
        // A stale deadline after the notification must stay silent
        controller.on_liveness_deadline();

        assert_eq!(*errors.count.lock().unwrap(), 1);
    }

    #[test]
    fn test_liveness_reply_disarms_deadline() {
        let mut controller = SessionController::new(NullTransport::default());
        controller.handle_event(TransportEvent::StateChanged(ConnectionState::Connected));

        controller.on_heartbeat_tick();
        controller.handle_event(TransportEvent::LivenessReply);

        assert!(!controller.liveness_armed());
    }
}
