/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Per-connection driver.
//!
//! Each connection gets one worker task. The worker activates the session,
//! then feeds inbound messages to the [`SessionRole`] strictly in arrival
//! order, so the sequence checks of a connection never run concurrently.

use crate::application::{Application, ErrorAction};
use fixlink_core::message::FixMessage;
use fixlink_session::connection::{Connection, ConnectionId};
use fixlink_session::registry::SessionStore;
use fixlink_session::role::{Disposition, SessionRole};
use fixlink_session::session::Session;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// FIX session engine driving one worker per connection.
pub struct Engine<A: Application> {
    role: Arc<dyn SessionRole>,
    sessions: Arc<dyn SessionStore>,
    application: Arc<A>,
}

impl<A: Application> Engine<A> {
    /// Creates an engine from its parts.
    ///
    /// `sessions` must be the store `role` registers sessions in.
    #[must_use]
    pub fn new(
        role: Arc<dyn SessionRole>,
        sessions: Arc<dyn SessionStore>,
        application: Arc<A>,
    ) -> Self {
        Self {
            role,
            sessions,
            application,
        }
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Returns the session bound to `connection`, if any.
    #[must_use]
    pub fn session(&self, connection: ConnectionId) -> Option<Arc<Session>> {
        self.sessions.get(connection)
    }

    /// Returns the application handler.
    #[must_use]
    pub fn application(&self) -> &Arc<A> {
        &self.application
    }

    /// Drives `connection` to completion on the current task.
    ///
    /// Returns when `inbound` is exhausted, the connection is closed, or a
    /// fatal session error occurs. The session is torn down in every case.
    pub async fn run_connection(
        &self,
        connection: Arc<dyn Connection>,
        inbound: mpsc::Receiver<FixMessage>,
    ) {
        let worker = ConnectionWorker {
            role: Arc::clone(&self.role),
            application: Arc::clone(&self.application),
            connection,
        };
        worker.run(inbound).await;
    }
}

impl<A: Application + 'static> Engine<A> {
    /// Spawns the worker task for `connection`.
    ///
    /// # Arguments
    /// * `connection` - Outbound side of the transport
    /// * `inbound` - Decoded messages in arrival order
    pub fn spawn_connection(
        &self,
        connection: Arc<dyn Connection>,
        inbound: mpsc::Receiver<FixMessage>,
    ) -> JoinHandle<()> {
        let worker = ConnectionWorker {
            role: Arc::clone(&self.role),
            application: Arc::clone(&self.application),
            connection,
        };
        tokio::spawn(worker.run(inbound))
    }
}

impl<A: Application> std::fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

struct ConnectionWorker<A: Application> {
    role: Arc<dyn SessionRole>,
    application: Arc<A>,
    connection: Arc<dyn Connection>,
}

impl<A: Application> ConnectionWorker<A> {
    async fn run(self, mut inbound: mpsc::Receiver<FixMessage>) {
        let id = self.connection.id();

        match self.role.on_activate(self.connection.as_ref()) {
            Ok(session) => self.application.on_create(session.id(), id).await,
            Err(err) => {
                error!(connection = %id, error = %err, "session activation failed");
                self.connection.close();
                self.shutdown().await;
                return;
            }
        }

        while let Some(message) = inbound.recv().await {
            if !self.connection.is_open() {
                debug!(connection = %id, "connection closed, stopping worker");
                break;
            }
            if !self.process(message).await {
                break;
            }
        }

        self.shutdown().await;
    }

    /// Handles one inbound message. Returns false once the worker must stop.
    async fn process(&self, message: FixMessage) -> bool {
        let id = self.connection.id();
        match self
            .role
            .on_inbound_message(self.connection.as_ref(), message)
        {
            Ok(Disposition::Established(session)) => {
                self.application.on_logon(session.id(), id).await;
                true
            }
            Ok(Disposition::Forward(message)) => {
                if message.msg_type().is_admin() {
                    self.application.from_admin(&message, id).await;
                } else {
                    self.application.from_app(&message, id).await;
                }
                true
            }
            Ok(Disposition::ResendRequested { begin, end, held }) => {
                debug!(connection = %id, begin = %begin, end = %end, "holding out-of-order message");
                self.application.on_out_of_order(held, id).await;
                true
            }
            Err(err) if err.is_fatal() => {
                warn!(connection = %id, error = %err, "fatal session error");
                self.connection.close();
                false
            }
            Err(err) => match self.application.on_protocol_error(&err, id).await {
                ErrorAction::Continue => {
                    debug!(connection = %id, error = %err, "protocol error ignored by application");
                    true
                }
                ErrorAction::Disconnect => {
                    warn!(connection = %id, error = %err, "disconnecting after protocol error");
                    self.connection.close();
                    false
                }
            },
        }
    }

    async fn shutdown(&self) {
        let id = self.connection.id();
        self.role.on_close(self.connection.as_ref());
        info!(connection = %id, "connection worker finished");
        self.application.on_disconnect(id).await;
    }
}
