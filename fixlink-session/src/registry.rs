/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session store.
//!
//! Associates each live connection with its [`Session`]. This is the only
//! state shared across connections, so the in-memory implementation uses a
//! sharded map: workers of unrelated connections do not contend.

use crate::connection::ConnectionId;
use crate::session::Session;
use dashmap::DashMap;
use std::sync::Arc;

/// Keyed association between a live connection and its session.
pub trait SessionStore: Send + Sync {
    /// Registers `session` for `connection`, replacing any previous entry.
    fn put(&self, connection: ConnectionId, session: Arc<Session>);

    /// Returns the session registered for `connection`.
    fn get(&self, connection: ConnectionId) -> Option<Arc<Session>>;

    /// Removes and returns the session registered for `connection`.
    fn remove(&self, connection: ConnectionId) -> Option<Arc<Session>>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<ConnectionId, Arc<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, connection: ConnectionId, session: Arc<Session>) {
        self.sessions.insert(connection, session);
    }

    fn get(&self, connection: ConnectionId) -> Option<Arc<Session>> {
        self.sessions
            .get(&connection)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn remove(&self, connection: ConnectionId) -> Option<Arc<Session>> {
        self.sessions.remove(&connection).map(|(_, session)| session)
    }
}
