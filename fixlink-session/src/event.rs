/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session events delivered downstream.

use crate::connection::ConnectionId;
use crate::session::{Session, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Event emitted by the handshake engine to the business-message layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The logon exchange was verified. Emitted at most once per session.
    Established {
        /// Connection the session is bound to.
        connection: ConnectionId,
        /// The established session.
        session: Arc<Session>,
    },
    /// The session ended and no further messages will be processed.
    Terminated {
        /// Connection the session was bound to.
        connection: ConnectionId,
        /// Identity of the terminated session.
        session_id: SessionId,
        /// Why the session ended.
        reason: String,
    },
}

impl SessionEvent {
    /// Returns the connection the event refers to.
    #[must_use]
    pub const fn connection(&self) -> ConnectionId {
        match self {
            Self::Established { connection, .. } | Self::Terminated { connection, .. } => {
                *connection
            }
        }
    }
}

/// Downstream consumer of [`SessionEvent`]s.
pub trait EventSink: Send + Sync {
    /// Delivers an event. Must not block.
    fn emit(&self, event: SessionEvent);
}

impl EventSink for mpsc::UnboundedSender<SessionEvent> {
    fn emit(&self, event: SessionEvent) {
        if let Err(err) = self.send(event) {
            debug!(connection = %err.0.connection(), "event receiver dropped");
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: SessionEvent) {}
}
