/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Connection abstraction.
//!
//! The handshake engine never touches a socket. It talks to a [`Connection`],
//! which any transport adapter can implement. Sends are fire-and-forget: the
//! engine does not wait for the write to complete.

use fixlink_core::message::FixMessage;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a live connection, used as the Session Store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a connection ID from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Allocates a process-unique connection ID.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound side of a transport connection.
pub trait Connection: Send + Sync {
    /// Returns the connection identity.
    fn id(&self) -> ConnectionId;

    /// Queues a prepared message for transmission without waiting for the write.
    fn send(&self, message: FixMessage);

    /// Closes the connection. Calling it more than once has no further effect.
    fn close(&self);

    /// Returns true until [`Connection::close`] has been called.
    fn is_open(&self) -> bool;
}

/// Command delivered to the transport writer of a [`ChannelConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Encode and write this message.
    Message(FixMessage),
    /// Flush and close the transport.
    Close,
}

/// Connection backed by an unbounded tokio channel.
///
/// The receiving half belongs to the transport writer task, which encodes
/// messages and performs the actual I/O.
#[derive(Debug)]
pub struct ChannelConnection {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outbound>,
    open: AtomicBool,
}

impl ChannelConnection {
    /// Creates a connection and the receiver its writer task drains.
    #[must_use]
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Self {
            id,
            tx,
            open: AtomicBool::new(true),
        };
        (connection, rx)
    }
}

impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, message: FixMessage) {
        if !self.is_open() {
            debug!(connection = %self.id, msg_type = %message.msg_type(), "dropping message on closed connection");
            return;
        }
        if self.tx.send(Outbound::Message(message)).is_err() {
            debug!(connection = %self.id, "transport writer gone, message dropped");
        }
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!(connection = %self.id, "closing connection");
            let _ = self.tx.send(Outbound::Close);
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::message::MsgType;

    #[test]
    fn test_connection_id_unique() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_channel_connection_send_and_close() {
        let (conn, mut rx) = ChannelConnection::new(ConnectionId::new(1));
        conn.send(FixMessage::new(MsgType::Heartbeat));
        conn.close();
        conn.close();
        conn.send(FixMessage::new(MsgType::Heartbeat));

        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::Message(FixMessage::new(MsgType::Heartbeat))
        );
        assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
        assert!(rx.try_recv().is_err());
        assert!(!conn.is_open());
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (conn, rx) = ChannelConnection::new(ConnectionId::new(2));
        drop(rx);
        conn.send(FixMessage::new(MsgType::Logon));
        assert!(conn.is_open());
    }
}
