//! Transport abstraction for the session layer.
//!
//! The transport itself — opening sockets, TLS, ping/pong frame mechanics —
//! lives outside this crate. Implementations expose the three outbound
//! operations of [`Transport`] and feed [`TransportEvent`]s back into the
//! session (directly via `SessionController::handle_event`, or through the
//! driver's event channel).

/// Connection state as reported by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection attempt in progress.
    Connecting,
    /// Transport is open for traffic.
    Connected,
    /// Graceful shutdown initiated.
    Closing,
    /// No transport; the session is fully reset in this state.
    #[default]
    Disconnected,
}

impl ConnectionState {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Close codes the session layer hands to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    /// Normal closure.
    Normal,
    /// Generic protocol error.
    ProtocolError,
    /// Peer sent data of an unacceptable shape or type.
    UnsupportedData,
}

impl CloseCode {
    /// The WebSocket-compatible numeric close code.
    pub fn code(&self) -> u16 {
        match self {
            Self::Normal => 1000,
            Self::ProtocolError => 1002,
            Self::UnsupportedData => 1003,
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Events a transport implementation feeds into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The transport's connection state changed.
    StateChanged(ConnectionState),
    /// A complete text frame arrived.
    Text(String),
    /// The peer answered a liveness probe.
    LivenessReply,
    /// Transport-level error.
    Error(String),
    /// TLS handshake or certificate error.
    TlsError(String),
}

/// Outbound operations the session layer requires from a transport.
pub trait Transport {
    /// Queue one text frame for transmission.
    fn send_text(&mut self, frame: String);

    /// Send a transport-level liveness probe.
    fn send_probe(&mut self);

    /// Close the transport with a code and diagnostic reason.
    fn close(&mut self, code: CloseCode, reason: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_numbers() {
        assert_eq!(CloseCode::Normal.code(), 1000);
        assert_eq!(CloseCode::ProtocolError.code(), 1002);
        assert_eq!(CloseCode::UnsupportedData.code(), 1003);
    }

    #[test]
    fn test_state_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }
}
