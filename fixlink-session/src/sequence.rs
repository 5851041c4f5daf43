/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Incoming sequence number validation.
//!
//! Classification ([`check_incoming`]) is a single atomic step against the
//! session's expected counter. Enforcement ([`enforce_sequence`]) acts on the
//! result: a gap triggers a Resend Request, a regression ends the session.

use crate::admin::build_resend_request;
use crate::connection::Connection;
use crate::event::{EventSink, SessionEvent};
use crate::outbound::prepare_message_to_send;
use crate::session::{Session, SessionStatus};
use fixlink_core::error::SessionError;
use fixlink_core::types::SeqNum;
use tracing::{debug, warn};

/// Result of comparing a received sequence number with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// The number matched and the expected counter advanced by one.
    Accepted,
    /// The number is ahead of the expected one; messages were missed.
    Gap {
        /// Expected sequence number.
        expected: SeqNum,
        /// Received sequence number.
        received: SeqNum,
    },
    /// The number is behind the expected one.
    Regression {
        /// Expected sequence number.
        expected: SeqNum,
        /// Received sequence number.
        received: SeqNum,
    },
}

impl SequenceCheck {
    /// Returns true if the number was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns true if a gap was detected.
    #[must_use]
    pub const fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }

    /// Returns true if the number went backwards.
    #[must_use]
    pub const fn is_regression(&self) -> bool {
        matches!(self, Self::Regression { .. })
    }
}

/// Classifies `received` against the session's expected incoming number.
///
/// The expected counter is advanced only on [`SequenceCheck::Accepted`]. Two
/// concurrent callers presenting the same number cannot both be accepted.
pub fn check_incoming(session: &Session, received: SeqNum) -> SequenceCheck {
    if session.check_and_increment_incoming_seq_num(received) {
        return SequenceCheck::Accepted;
    }

    let expected = session.next_incoming_seq_num();
    if received > expected {
        SequenceCheck::Gap { expected, received }
    } else {
        SequenceCheck::Regression { expected, received }
    }
}

/// What happened after a sequence number passed enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// The message was in order and has been consumed.
    InOrder,
    /// A Resend Request for `begin..=end` was sent; the message was not consumed.
    GapRequested {
        /// First missing sequence number.
        begin: SeqNum,
        /// Last missing sequence number.
        end: SeqNum,
    },
}

/// Validates `received` and acts on the result.
///
/// On a gap a Resend Request covering the missing range is prepared and sent
/// over `connection`. On a regression the session is terminated, a
/// [`SessionEvent::Terminated`] is emitted and the connection is closed.
///
/// # Errors
/// Returns `SessionError::SequenceRegression` when `received` is lower than
/// expected.
pub fn enforce_sequence(
    session: &Session,
    connection: &dyn Connection,
    events: &dyn EventSink,
    received: SeqNum,
) -> Result<SequenceOutcome, SessionError> {
    match check_incoming(session, received) {
        SequenceCheck::Accepted => {
            debug!(connection = %connection.id(), seq = %received, "sequence accepted");
            Ok(SequenceOutcome::InOrder)
        }
        SequenceCheck::Gap { expected, received } => {
            let begin = expected;
            let end = SeqNum::new(received.value() - 1);
            warn!(
                connection = %connection.id(),
                session = %session.id(),
                expected = %expected,
                received = %received,
                "sequence gap detected, requesting resend"
            );
            let mut resend = build_resend_request(begin, end);
            prepare_message_to_send(session, &mut resend);
            connection.send(resend);
            Ok(SequenceOutcome::GapRequested { begin, end })
        }
        SequenceCheck::Regression { expected, received } => {
            warn!(
                connection = %connection.id(),
                session = %session.id(),
                expected = %expected,
                received = %received,
                "message sequence too low, closing connection"
            );
            if session.terminate() != SessionStatus::Terminated {
                events.emit(SessionEvent::Terminated {
                    connection: connection.id(),
                    session_id: session.id().clone(),
                    reason: format!(
                        "MsgSeqNum too low, expecting {expected} but received {received}"
                    ),
                });
            }
            connection.close();
            Err(SessionError::SequenceRegression {
                expected: expected.value(),
                received: received.value(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ChannelConnection, ConnectionId, Outbound};
    use fixlink_core::field::tags;
    use fixlink_core::message::MsgType;
    use fixlink_core::types::CompId;
    use tokio::sync::mpsc;

    fn session_expecting(incoming: u64) -> Session {
        let mut session = Session::builder(
            "FIX.4.4",
            CompId::new("CLIENT").unwrap(),
            CompId::new("SERVER").unwrap(),
        )
        .build();
        session
            .set_next_incoming_seq_num(SeqNum::new(incoming))
            .unwrap();
        session
    }

    #[test]
    fn test_check_incoming_classification() {
        let session = session_expecting(5);

        assert_eq!(
            check_incoming(&session, SeqNum::new(8)),
            SequenceCheck::Gap {
                expected: SeqNum::new(5),
                received: SeqNum::new(8)
            }
        );
        assert!(check_incoming(&session, SeqNum::new(3)).is_regression());
        assert_eq!(session.next_incoming_seq_num().value(), 5);

        assert!(check_incoming(&session, SeqNum::new(5)).is_accepted());
        assert_eq!(session.next_incoming_seq_num().value(), 6);
    }

    #[test]
    fn test_repeated_number_is_regression_after_accept() {
        let session = session_expecting(1);
        assert!(check_incoming(&session, SeqNum::new(1)).is_accepted());
        assert!(check_incoming(&session, SeqNum::new(1)).is_regression());
    }

    #[test]
    fn test_enforce_gap_sends_resend_request() {
        let session = session_expecting(5);
        let (conn, mut rx) = ChannelConnection::new(ConnectionId::new(1));
        let (events, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();

        let outcome = enforce_sequence(&session, &conn, &events, SeqNum::new(8)).unwrap();
        assert_eq!(
            outcome,
            SequenceOutcome::GapRequested {
                begin: SeqNum::new(5),
                end: SeqNum::new(7)
            }
        );

        let Outbound::Message(resend) = rx.try_recv().unwrap() else {
            panic!("expected a resend request");
        };
        assert_eq!(resend.msg_type(), &MsgType::ResendRequest);
        assert_eq!(resend.get_field_u64(tags::BEGIN_SEQ_NO), Some(5));
        assert_eq!(resend.get_field_u64(tags::END_SEQ_NO), Some(7));
        assert_eq!(resend.msg_seq_num(), Some(SeqNum::new(1)));

        assert_eq!(session.next_incoming_seq_num().value(), 5);
        assert!(conn.is_open());
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn test_enforce_regression_closes() {
        let session = session_expecting(5);
        let (conn, mut rx) = ChannelConnection::new(ConnectionId::new(2));
        let (events, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();

        let err = enforce_sequence(&session, &conn, &events, SeqNum::new(3)).unwrap_err();
        assert_eq!(
            err,
            SessionError::SequenceRegression {
                expected: 5,
                received: 3
            }
        );

        assert_eq!(rx.try_recv().unwrap(), Outbound::Close);
        assert!(rx.try_recv().is_err());
        assert!(!conn.is_open());
        assert!(session.is_terminated());
        assert_eq!(session.next_incoming_seq_num().value(), 5);
        assert_eq!(session.next_outgoing_seq_num().value(), 1);
        assert!(matches!(
            events_rx.try_recv().unwrap(),
            SessionEvent::Terminated { .. }
        ));
    }

    #[test]
    fn test_enforce_in_order() {
        let session = session_expecting(1);
        let (conn, mut rx) = ChannelConnection::new(ConnectionId::new(3));

        let outcome =
            enforce_sequence(&session, &conn, &crate::event::NoOpEventSink, SeqNum::new(1))
                .unwrap();
        assert_eq!(outcome, SequenceOutcome::InOrder);
        assert!(rx.try_recv().is_err());
        assert_eq!(session.next_incoming_seq_num().value(), 2);
    }
}
