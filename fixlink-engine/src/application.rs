/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Application callback interface.
//!
//! The engine calls into an [`Application`] for every message that clears the
//! session checks, and asks it what to do when a protocol state error is
//! raised.

use async_trait::async_trait;
use fixlink_core::error::SessionError;
use fixlink_core::message::FixMessage;
use fixlink_session::connection::ConnectionId;
use fixlink_session::session::SessionId;

/// What the engine does with a connection after a recoverable protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Keep processing inbound messages.
    Continue,
    /// Close the connection and tear the session down.
    #[default]
    Disconnect,
}

/// Application callback interface for handling FIX messages.
///
/// Implement this trait to receive session lifecycle callbacks and the
/// messages forwarded by the handshake engine.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called when a session is created for a new connection.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    /// * `connection` - The connection the session is bound to
    async fn on_create(&self, session_id: &SessionId, connection: ConnectionId);

    /// Called once the counterparty's Logon has been verified.
    async fn on_logon(&self, session_id: &SessionId, connection: ConnectionId);

    /// Called after the connection's session has been torn down.
    async fn on_disconnect(&self, connection: ConnectionId);

    /// Called when a forwarded admin message is received.
    ///
    /// # Arguments
    /// * `message` - The received message
    /// * `connection` - The connection it arrived on
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(&self, message: &FixMessage, connection: ConnectionId);

    /// Called when a forwarded application message is received.
    ///
    /// # Arguments
    /// * `message` - The received message
    /// * `connection` - The connection it arrived on
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(&self, message: &FixMessage, connection: ConnectionId);

    /// Called with a message that arrived ahead of a sequence gap.
    ///
    /// A Resend Request has already been sent. The default drops the message.
    async fn on_out_of_order(&self, _message: FixMessage, _connection: ConnectionId) {}

    /// Decides the connection's fate after a `SessionError::ProtocolState`.
    ///
    /// The default disconnects.
    async fn on_protocol_error(&self, _error: &SessionError, _connection: ConnectionId) -> ErrorAction {
        ErrorAction::Disconnect
    }
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_create(&self, _session_id: &SessionId, _connection: ConnectionId) {}

    async fn on_logon(&self, _session_id: &SessionId, _connection: ConnectionId) {}

    async fn on_disconnect(&self, _connection: ConnectionId) {}

    async fn from_admin(&self, _message: &FixMessage, _connection: ConnectionId) {}

    async fn from_app(&self, _message: &FixMessage, _connection: ConnectionId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::message::MsgType;

    #[test]
    fn test_error_action_default() {
        assert_eq!(ErrorAction::default(), ErrorAction::Disconnect);
    }

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        let session_id = SessionId::new("FIX.4.4", "SENDER", "TARGET");
        let conn = ConnectionId::new(1);

        app.on_create(&session_id, conn).await;
        app.on_logon(&session_id, conn).await;
        app.from_app(&FixMessage::new(MsgType::ExecutionReport), conn)
            .await;
        app.on_out_of_order(FixMessage::new(MsgType::Heartbeat), conn)
            .await;
        app.on_disconnect(conn).await;

        let action = app
            .on_protocol_error(&SessionError::protocol_state("duplicate logon"), conn)
            .await;
        assert_eq!(action, ErrorAction::Disconnect);
    }
}
