/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Initiator side of the session handshake.
//!
//! On activation the initiator creates a pending [`Session`], registers it in
//! the [`SessionStore`] and sends a Logon. The counterparty's Logon response
//! is sequence-checked before the session is promoted to established; after
//! that every inbound message goes through the same check.

use crate::admin::build_logon_request;
use crate::config::SettingsProvider;
use crate::connection::Connection;
use crate::credentials::CredentialProvider;
use crate::event::{EventSink, SessionEvent};
use crate::outbound::prepare_message_to_send;
use crate::registry::SessionStore;
use crate::role::{Disposition, SessionRole};
use crate::sequence::{SequenceOutcome, enforce_sequence};
use crate::session::{Session, SessionStatus};
use fixlink_core::error::SessionError;
use fixlink_core::message::{FixMessage, MsgType};
use fixlink_core::types::{DEFAULT_APPL_VER_ID, SeqNum, is_newest_major_revision};
use fixlink_store::SequenceProvider;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handshake engine for the connecting side of a session.
pub struct Initiator {
    settings: Arc<dyn SettingsProvider>,
    sequences: Arc<dyn SequenceProvider>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    sessions: Arc<dyn SessionStore>,
    events: Arc<dyn EventSink>,
}

impl Initiator {
    /// Creates an initiator without a credential provider.
    ///
    /// # Arguments
    /// * `settings` - Identity and logon parameters
    /// * `sequences` - Persisted sequence numbers used to seed new sessions
    /// * `sessions` - Store shared by every connection of this engine
    /// * `events` - Receiver of established and terminated signals
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        sequences: Arc<dyn SequenceProvider>,
        sessions: Arc<dyn SessionStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            settings,
            sequences,
            credentials: None,
            sessions,
            events,
        }
    }

    /// Attaches a credential provider queried for every Logon.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Creates a pending session from the settings and sequence providers.
    ///
    /// # Errors
    /// Returns `FixError::Store` if a persisted sequence number cannot be read,
    /// or `FixError::Session` if a persisted value is not a valid seed.
    pub fn create_session(&self) -> fixlink_core::Result<Session> {
        let settings = self.settings.as_ref();
        let begin_string = settings.begin_string();

        let mut session = Session::builder(
            begin_string,
            settings.sender_comp_id().clone(),
            settings.target_comp_id().clone(),
        )
        .sender_sub_id(settings.sender_sub_id().map(String::from))
        .sender_location_id(settings.sender_location_id().map(String::from))
        .target_sub_id(settings.target_sub_id().map(String::from))
        .target_location_id(settings.target_location_id().map(String::from))
        .timestamp_precision(settings.timestamp_precision())
        .default_appl_ver_id(resolve_appl_ver_id(
            begin_string,
            settings.default_appl_ver_id(),
        ))
        .default_appl_ext_id(settings.default_appl_ext_id().map(String::from))
        .build();

        session.set_next_outgoing_seq_num(self.sequences.persisted_outgoing_seq_num()?)?;
        let incoming = if settings.reset_seq_num_on_logon() {
            SeqNum::new(1)
        } else {
            self.sequences.persisted_incoming_seq_num()?
        };
        session.set_next_incoming_seq_num(incoming)?;

        debug!(
            session = %session.id(),
            next_outgoing = %session.next_outgoing_seq_num(),
            next_incoming = %session.next_incoming_seq_num(),
            "session created"
        );
        Ok(session)
    }

    /// Builds the unstamped Logon request for `session`.
    #[must_use]
    pub fn create_logon_request(&self, session: &Session) -> FixMessage {
        build_logon_request(
            session,
            self.settings.heartbeat_interval(),
            self.credentials.as_deref(),
        )
    }

    fn enforce(
        &self,
        session: &Session,
        connection: &dyn Connection,
        message: &FixMessage,
    ) -> Result<SequenceOutcome, SessionError> {
        let received = message
            .msg_seq_num()
            .filter(|seq| seq.is_valid() && seq.value() < u64::MAX)
            .ok_or_else(|| {
                SessionError::protocol_state(format!(
                    "{} received without a valid MsgSeqNum",
                    message.msg_type()
                ))
            })?;
        enforce_sequence(session, connection, self.events.as_ref(), received)
    }

    fn on_logon(
        &self,
        session: Option<Arc<Session>>,
        connection: &dyn Connection,
        message: FixMessage,
    ) -> Result<Disposition, SessionError> {
        let Some(session) = session else {
            warn!(connection = %connection.id(), "logon received with no pending session");
            return Err(SessionError::protocol_state(
                "logon received with no pending session",
            ));
        };
        if session.is_established() {
            warn!(
                connection = %connection.id(),
                session = %session.id(),
                "duplicate logon on established session"
            );
            return Err(SessionError::protocol_state(
                "duplicate logon on established session",
            ));
        }

        match self.enforce(&session, connection, &message)? {
            SequenceOutcome::InOrder => {
                if !session.mark_established() {
                    return Err(SessionError::Terminated);
                }
                info!(
                    connection = %connection.id(),
                    session = %session.id(),
                    "Session established"
                );
                self.events.emit(SessionEvent::Established {
                    connection: connection.id(),
                    session: Arc::clone(&session),
                });
                Ok(Disposition::Established(session))
            }
            SequenceOutcome::GapRequested { begin, end } => Ok(Disposition::ResendRequested {
                begin,
                end,
                held: message,
            }),
        }
    }
}

impl fmt::Debug for Initiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initiator")
            .field("begin_string", &self.settings.begin_string())
            .field("sender_comp_id", self.settings.sender_comp_id())
            .field("target_comp_id", self.settings.target_comp_id())
            .field("credentials", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionRole for Initiator {
    fn on_activate(&self, connection: &dyn Connection) -> fixlink_core::Result<Arc<Session>> {
        info!(
            connection = %connection.id(),
            "Connection established, starting initiator session"
        );
        let session = Arc::new(self.create_session()?);
        self.sessions.put(connection.id(), Arc::clone(&session));

        let mut logon = self.create_logon_request(&session);
        prepare_message_to_send(&session, &mut logon);
        info!(
            connection = %connection.id(),
            session = %session.id(),
            seq = ?logon.msg_seq_num(),
            "Sending logon"
        );
        connection.send(logon);
        Ok(session)
    }

    fn on_inbound_message(
        &self,
        connection: &dyn Connection,
        message: FixMessage,
    ) -> Result<Disposition, SessionError> {
        let session = self.sessions.get(connection.id());
        if session.as_ref().is_some_and(|s| s.is_terminated()) {
            return Err(SessionError::Terminated);
        }

        if *message.msg_type() == MsgType::Logon {
            return self.on_logon(session, connection, message);
        }

        match session {
            Some(session) if session.is_established() => {
                match self.enforce(&session, connection, &message)? {
                    SequenceOutcome::InOrder => Ok(Disposition::Forward(message)),
                    SequenceOutcome::GapRequested { begin, end } => {
                        Ok(Disposition::ResendRequested {
                            begin,
                            end,
                            held: message,
                        })
                    }
                }
            }
            _ => Ok(Disposition::Forward(message)),
        }
    }

    fn on_close(&self, connection: &dyn Connection) {
        let Some(session) = self.sessions.remove(connection.id()) else {
            debug!(connection = %connection.id(), "no session registered for closed connection");
            return;
        };
        let previous = session.terminate();
        if previous != SessionStatus::Terminated {
            info!(
                connection = %connection.id(),
                session = %session.id(),
                status = %previous,
                "Session closed"
            );
            self.events.emit(SessionEvent::Terminated {
                connection: connection.id(),
                session_id: session.id().clone(),
                reason: format!("connection closed while {previous}"),
            });
        }
    }
}

/// Picks the DefaultApplVerID a new session carries.
///
/// A configured non-blank value always wins. Otherwise the newest major
/// revision falls back to [`DEFAULT_APPL_VER_ID`].
fn resolve_appl_ver_id(begin_string: &str, configured: Option<&str>) -> Option<String> {
    match configured {
        Some(id) if !id.trim().is_empty() => Some(id.to_string()),
        _ if is_newest_major_revision(begin_string) => Some(DEFAULT_APPL_VER_ID.to_string()),
        other => other.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::connection::{ChannelConnection, ConnectionId, Outbound};
    use crate::credentials::Credentials;
    use crate::registry::MemorySessionStore;
    use fixlink_core::field::tags;
    use fixlink_core::types::{CompId, TimestampPrecision};
    use fixlink_store::MemorySequenceStore;
    use tokio::sync::mpsc;

    struct Harness {
        initiator: Initiator,
        store: Arc<MemorySessionStore>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        conn: ChannelConnection,
        wire: mpsc::UnboundedReceiver<Outbound>,
    }

    impl Harness {
        fn new(settings: SessionSettings, outgoing: u64, incoming: u64) -> Self {
            let store = Arc::new(MemorySessionStore::new());
            let (events_tx, events) = mpsc::unbounded_channel::<SessionEvent>();
            let initiator = Initiator::new(
                Arc::new(settings),
                Arc::new(MemorySequenceStore::with_initial_seqs(outgoing, incoming)),
                store.clone(),
                Arc::new(events_tx),
            );
            let (conn, wire) = ChannelConnection::new(ConnectionId::new(1));
            Self {
                initiator,
                store,
                events,
                conn,
                wire,
            }
        }

        fn activate(&mut self) -> Arc<Session> {
            let session = self.initiator.on_activate(&self.conn).unwrap();
            let Outbound::Message(logon) = self.wire.try_recv().unwrap() else {
                panic!("expected a logon");
            };
            assert_eq!(logon.msg_type(), &MsgType::Logon);
            session
        }

        fn inbound(&self, msg_type: MsgType, seq: u64) -> Result<Disposition, SessionError> {
            self.initiator.on_inbound_message(
                &self.conn,
                FixMessage::new(msg_type).with_msg_seq_num(seq),
            )
        }
    }

    fn settings(begin_string: &str) -> SessionSettings {
        SessionSettings::new(
            CompId::new("CLIENT").unwrap(),
            CompId::new("SERVER").unwrap(),
            begin_string,
        )
    }

    #[test]
    fn test_create_session_copies_settings() {
        let settings = settings("FIX.4.4")
            .with_sender_sub_id("DESK")
            .with_sender_location_id("NY")
            .with_target_sub_id("ROUTER")
            .with_target_location_id("LDN")
            .with_default_appl_ext_id("ext")
            .with_timestamp_precision(TimestampPrecision::Nanos);
        let harness = Harness::new(settings, 10, 20);

        let session = harness.initiator.create_session().unwrap();
        assert_eq!(session.begin_string(), "FIX.4.4");
        assert_eq!(session.sender_comp_id().as_str(), "CLIENT");
        assert_eq!(session.sender_sub_id(), Some("DESK"));
        assert_eq!(session.sender_location_id(), Some("NY"));
        assert_eq!(session.target_comp_id().as_str(), "SERVER");
        assert_eq!(session.target_sub_id(), Some("ROUTER"));
        assert_eq!(session.target_location_id(), Some("LDN"));
        assert_eq!(session.default_appl_ver_id(), None);
        assert_eq!(session.default_appl_ext_id(), Some("ext"));
        assert_eq!(session.timestamp_precision(), TimestampPrecision::Nanos);
        assert_eq!(session.next_outgoing_seq_num().value(), 10);
        assert_eq!(session.next_incoming_seq_num().value(), 20);
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn test_create_session_keeps_configured_appl_ver_id() {
        let harness = Harness::new(settings("FIXT.1.1").with_default_appl_ver_id("9"), 1, 1);
        let session = harness.initiator.create_session().unwrap();
        assert_eq!(session.begin_string(), "FIXT.1.1");
        assert_eq!(session.default_appl_ver_id(), Some("9"));
    }

    #[test]
    fn test_create_session_reset_seeds_incoming_at_one() {
        let harness = Harness::new(settings("FIX.4.4").with_reset_seq_num_on_logon(true), 10, 20);
        let session = harness.initiator.create_session().unwrap();
        assert_eq!(session.next_outgoing_seq_num().value(), 10);
        assert_eq!(session.next_incoming_seq_num().value(), 1);
    }

    #[test]
    fn test_create_session_rejects_zero_persisted_seq() {
        let harness = Harness::new(settings("FIX.4.4"), 0, 1);
        assert!(harness.initiator.create_session().is_err());
    }

    #[test]
    fn test_appl_ver_id_fallback() {
        assert_eq!(resolve_appl_ver_id("FIXT.1.1", None).as_deref(), Some("7"));
        assert_eq!(resolve_appl_ver_id("fixt.1.1", Some(" ")).as_deref(), Some("7"));
        assert_eq!(resolve_appl_ver_id("FIXT.1.1", Some("9")).as_deref(), Some("9"));
        assert_eq!(resolve_appl_ver_id("FIX.4.4", None), None);
        assert_eq!(resolve_appl_ver_id("FIX.4.4", Some("9")).as_deref(), Some("9"));
    }

    #[test]
    fn test_activate_registers_pending_session_and_sends_logon() {
        let mut harness = Harness::new(settings("FIXT.1.1"), 3, 1);
        let session = harness.initiator.on_activate(&harness.conn).unwrap();

        let registered = harness.store.get(ConnectionId::new(1)).unwrap();
        assert!(Arc::ptr_eq(&session, &registered));
        assert_eq!(session.status(), SessionStatus::Pending);

        let Outbound::Message(logon) = harness.wire.try_recv().unwrap() else {
            panic!("expected a logon");
        };
        assert_eq!(logon.msg_type(), &MsgType::Logon);
        assert_eq!(logon.msg_seq_num(), Some(SeqNum::new(3)));
        assert_eq!(logon.header().sender_comp_id.as_deref(), Some("CLIENT"));
        assert_eq!(logon.header().target_comp_id.as_deref(), Some("SERVER"));
        assert_eq!(logon.get_field_u64(tags::HEART_BT_INT), Some(30));
        assert_eq!(logon.get_field_str(tags::DEFAULT_APPL_VER_ID), Some("7"));
        assert_eq!(session.next_outgoing_seq_num().value(), 4);
        assert!(harness.events.try_recv().is_err());
    }

    #[test]
    fn test_logon_carries_credentials_only_when_provided() {
        let settings = settings("FIX.4.4");
        let store = Arc::new(MemorySessionStore::new());
        let initiator = Initiator::new(
            Arc::new(settings),
            Arc::new(MemorySequenceStore::new()),
            store,
            Arc::new(crate::event::NoOpEventSink),
        );
        let session = initiator.create_session().unwrap();
        assert!(!initiator.create_logon_request(&session).contains(tags::USERNAME));

        let initiator = initiator.with_credentials(Arc::new(Credentials::new("trader", "secret")));
        let logon = initiator.create_logon_request(&session);
        assert_eq!(logon.get_field_str(tags::USERNAME), Some("trader"));
        assert_eq!(logon.get_field_str(tags::PASSWORD), Some("secret"));
        assert!(!logon.contains(tags::DEFAULT_APPL_VER_ID));
    }

    #[test]
    fn test_exact_match_logon_establishes() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 5);
        let session = harness.activate();

        let disposition = harness.inbound(MsgType::Logon, 5).unwrap();
        assert!(matches!(disposition, Disposition::Established(ref s) if Arc::ptr_eq(s, &session)));
        assert!(session.is_established());
        assert_eq!(session.next_incoming_seq_num().value(), 6);

        assert!(matches!(
            harness.events.try_recv().unwrap(),
            SessionEvent::Established { .. }
        ));
        assert!(harness.events.try_recv().is_err());
        assert!(harness.wire.try_recv().is_err());
    }

    #[test]
    fn test_gap_on_logon_requests_resend_and_stays_pending() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 5);
        let session = harness.activate();

        let disposition = harness.inbound(MsgType::Logon, 8).unwrap();
        let Disposition::ResendRequested { begin, end, held } = disposition else {
            panic!("expected a resend request");
        };
        assert_eq!((begin.value(), end.value()), (5, 7));
        assert_eq!(held.msg_seq_num(), Some(SeqNum::new(8)));

        let Outbound::Message(resend) = harness.wire.try_recv().unwrap() else {
            panic!("expected a resend request on the wire");
        };
        assert_eq!(resend.msg_type(), &MsgType::ResendRequest);
        assert_eq!(resend.get_field_u64(tags::BEGIN_SEQ_NO), Some(5));
        assert_eq!(resend.get_field_u64(tags::END_SEQ_NO), Some(7));
        assert!(harness.wire.try_recv().is_err());

        assert_eq!(session.next_incoming_seq_num().value(), 5);
        assert_eq!(session.status(), SessionStatus::Pending);
        assert!(harness.events.try_recv().is_err());
    }

    #[test]
    fn test_regression_closes_connection() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 5);
        let session = harness.activate();

        let err = harness.inbound(MsgType::Logon, 3).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(harness.wire.try_recv().unwrap(), Outbound::Close);
        assert!(harness.wire.try_recv().is_err());
        assert_eq!(session.next_incoming_seq_num().value(), 5);
        assert!(session.is_terminated());

        assert_eq!(
            harness.inbound(MsgType::Heartbeat, 5).unwrap_err(),
            SessionError::Terminated
        );
    }

    #[test]
    fn test_duplicate_logon_is_protocol_error() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let session = harness.activate();
        harness.inbound(MsgType::Logon, 1).unwrap();
        harness.events.try_recv().unwrap();

        let err = harness.inbound(MsgType::Logon, 2).unwrap_err();
        assert_eq!(
            err,
            SessionError::protocol_state("duplicate logon on established session")
        );
        assert_eq!(session.next_incoming_seq_num().value(), 2);
        assert!(harness.events.try_recv().is_err());
        assert!(harness.conn.is_open());
    }

    #[test]
    fn test_logon_without_session_is_protocol_error() {
        let harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let err = harness.inbound(MsgType::Logon, 1).unwrap_err();
        assert_eq!(
            err,
            SessionError::protocol_state("logon received with no pending session")
        );
    }

    #[test]
    fn test_logon_without_seq_num_is_protocol_error() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let session = harness.activate();
        let err = harness
            .initiator
            .on_inbound_message(&harness.conn, FixMessage::new(MsgType::Logon))
            .unwrap_err();
        assert!(matches!(err, SessionError::ProtocolState(_)));
        assert_eq!(session.status(), SessionStatus::Pending);
    }

    #[test]
    fn test_logon_with_max_seq_num_is_protocol_error() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let session = harness.activate();

        let err = harness.inbound(MsgType::Logon, u64::MAX).unwrap_err();
        assert!(matches!(err, SessionError::ProtocolState(_)));
        assert_eq!(session.next_incoming_seq_num().value(), 1);
        assert_eq!(session.status(), SessionStatus::Pending);
        assert!(harness.wire.try_recv().is_err());
        assert!(harness.conn.is_open());
    }

    #[test]
    fn test_non_logon_passes_through_before_establishment() {
        let harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let disposition = harness.inbound(MsgType::ExecutionReport, 9).unwrap();
        assert!(matches!(disposition, Disposition::Forward(_)));
    }

    #[test]
    fn test_established_session_checks_every_message() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let session = harness.activate();
        harness.inbound(MsgType::Logon, 1).unwrap();

        let forwarded = harness.inbound(MsgType::ExecutionReport, 2).unwrap();
        assert!(matches!(forwarded, Disposition::Forward(ref m) if m.msg_type() == &MsgType::ExecutionReport));
        assert_eq!(session.next_incoming_seq_num().value(), 3);

        let gap = harness.inbound(MsgType::Heartbeat, 6).unwrap();
        assert!(matches!(gap, Disposition::ResendRequested { .. }));
        assert_eq!(session.next_incoming_seq_num().value(), 3);
        let Outbound::Message(resend) = harness.wire.try_recv().unwrap() else {
            panic!("expected a resend request");
        };
        assert_eq!(resend.get_field_u64(tags::BEGIN_SEQ_NO), Some(3));
        assert_eq!(resend.get_field_u64(tags::END_SEQ_NO), Some(5));
    }

    #[test]
    fn test_on_close_removes_entry_and_signals() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 1);
        let session = harness.activate();

        harness.initiator.on_close(&harness.conn);
        assert!(harness.store.is_empty());
        assert!(session.is_terminated());
        assert!(matches!(
            harness.events.try_recv().unwrap(),
            SessionEvent::Terminated { .. }
        ));

        harness.initiator.on_close(&harness.conn);
        assert!(harness.events.try_recv().is_err());
    }

    #[test]
    fn test_on_close_after_regression_signals_once() {
        let mut harness = Harness::new(settings("FIX.4.4"), 1, 5);
        harness.activate();
        harness.inbound(MsgType::Logon, 2).unwrap_err();
        harness.initiator.on_close(&harness.conn);

        assert!(matches!(
            harness.events.try_recv().unwrap(),
            SessionEvent::Terminated { .. }
        ));
        assert!(harness.events.try_recv().is_err());
        assert!(harness.store.is_empty());
    }
}
