/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Role-specific handshake entry points.

use crate::connection::Connection;
use crate::session::Session;
use fixlink_core::error::SessionError;
use fixlink_core::message::FixMessage;
use fixlink_core::types::SeqNum;
use std::sync::Arc;

/// Result of running an inbound message through the handshake engine.
#[derive(Debug)]
pub enum Disposition {
    /// The message was a valid Logon and the session is now established.
    ///
    /// The Logon is consumed by the handshake.
    Established(Arc<Session>),
    /// The message passed every check and goes to business processing.
    Forward(FixMessage),
    /// A gap was detected and a Resend Request for `begin..=end` was sent.
    ///
    /// `held` is handed back untouched for the ordering layer.
    ResendRequested {
        /// First missing sequence number.
        begin: SeqNum,
        /// Last missing sequence number.
        end: SeqNum,
        /// The out-of-order message.
        held: FixMessage,
    },
}

/// Handshake behaviour of one side of a session.
///
/// Every entry point is driven by a transport adapter. Calls for the same
/// connection must be serialized; calls for different connections may run in
/// parallel.
pub trait SessionRole: Send + Sync {
    /// Handles a newly activated connection.
    ///
    /// # Errors
    /// Returns an error if the session cannot be created from the configured
    /// providers.
    fn on_activate(&self, connection: &dyn Connection) -> fixlink_core::Result<Arc<Session>>;

    /// Validates an inbound message before business processing.
    ///
    /// # Errors
    /// Returns `SessionError::ProtocolState` for a Logon the session state does
    /// not allow, `SessionError::SequenceRegression` after closing the
    /// connection, and `SessionError::Terminated` once the session has ended.
    fn on_inbound_message(
        &self,
        connection: &dyn Connection,
        message: FixMessage,
    ) -> Result<Disposition, SessionError>;

    /// Releases the session bound to a closed connection.
    fn on_close(&self, connection: &dyn Connection);
}
