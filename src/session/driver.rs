//! Async session driver: event loop, heartbeat timer, liveness deadline.
//!
//! The controller is synchronous; the driver serializes everything touching
//! it onto one task. It multiplexes three sources with `tokio::select!`:
//!
//! - transport events from the event channel,
//! - application commands from [`SessionHandle`]s,
//! - the heartbeat interval and the one-shot liveness deadline.
//!
//! The deadline is armed when a probe goes out and dropped as soon as the
//! controller reports the reply arrived, so a cancelled deadline never
//! fires.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use super::controller::SessionController;
use crate::config::SessionConfig;
use crate::error::{ChefwireError, Result};
use crate::protocol::Message;
use crate::transport::{Transport, TransportEvent};

enum SessionCommand {
    SendRequest {
        cmd: String,
        data: Value,
        reply: oneshot::Sender<Result<u64>>,
    },
    SendResponse {
        request: Box<Message>,
        data: Value,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Cloneable handle for issuing messages through a running driver.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Issue a request; resolves to its correlation id.
    pub async fn send_request(&self, cmd: &str, data: Value) -> Result<u64> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(SessionCommand::SendRequest {
                cmd: cmd.to_string(),
                data,
                reply,
            })
            .map_err(|_| ChefwireError::Transport("session driver is gone".to_string()))?;
        answer
            .await
            .map_err(|_| ChefwireError::Transport("session driver dropped the request".to_string()))?
    }

    /// Answer a peer-issued request.
    pub async fn send_response(&self, request: &Message, data: Value) -> Result<()> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(SessionCommand::SendResponse {
                request: Box::new(request.clone()),
                data,
                reply,
            })
            .map_err(|_| ChefwireError::Transport("session driver is gone".to_string()))?;
        answer
            .await
            .map_err(|_| ChefwireError::Transport("session driver dropped the request".to_string()))?
    }
}

/// Runs a [`SessionController`] on a tokio task.
pub struct SessionDriver<T: Transport> {
    controller: SessionController<T>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    handle: SessionHandle,
    config: SessionConfig,
}

impl<T: Transport> SessionDriver<T> {
    /// Create a driver over `controller`, consuming transport events from
    /// `events`.
    pub fn new(
        controller: SessionController<T>,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        config: SessionConfig,
    ) -> Self {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        Self {
            controller,
            events,
            commands,
            handle: SessionHandle {
                commands: commands_tx,
            },
            config,
        }
    }

    /// A handle for issuing messages while the driver runs.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Drive the session until the event channel closes.
    pub async fn run(mut self) {
        let mut heartbeat = time::interval_at(
            time::Instant::now() + self.config.heartbeat_interval(),
            self.config.heartbeat_interval(),
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut deadline: Option<time::Instant> = None;
        let mut commands_open = true;

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.controller.handle_event(event),
                        None => break,
                    }
                }
                command = self.commands.recv(), if commands_open => {
                    match command {
                        Some(SessionCommand::SendRequest { cmd, data, reply }) => {
                            let _ = reply.send(self.controller.send_request(&cmd, data));
                        }
                        Some(SessionCommand::SendResponse { request, data, reply }) => {
                            let _ = reply.send(self.controller.send_response(&request, data));
                        }
                        None => commands_open = false,
                    }
                }
                _ = heartbeat.tick(), if self.controller.heartbeat_active() => {
                    self.controller.on_heartbeat_tick();
                    deadline = Some(time::Instant::now() + self.config.liveness_timeout());
                }
                () = async {
                    match deadline {
                        Some(at) => time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                }, if deadline.is_some() => {
                    self.controller.on_liveness_deadline();
                    deadline = None;
                }
            }

            if !self.controller.liveness_armed() {
                deadline = None;
            }
        }

        tracing::debug!("session driver stopped: event channel closed");
    }
}
