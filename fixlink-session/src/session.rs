/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! The session entity.
//!
//! A [`Session`] holds the immutable protocol identity of one connection and
//! its two sequence counters. Once shared behind an `Arc`, the counters can
//! only move through [`Session::check_and_increment_incoming_seq_num`] and
//! [`Session::allocate_outgoing_seq_num`]; the seeding setters need `&mut self`
//! and are therefore only reachable while the session is still being built.

use fixlink_core::error::SessionError;
use fixlink_core::types::{CompId, SeqNum, TimestampPrecision};
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

/// Session identifier used in logs and events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Sender CompID.
    pub sender_comp_id: String,
    /// Target CompID.
    pub target_comp_id: String,
    /// Optional sender sub ID.
    pub sender_sub_id: Option<String>,
    /// Optional target sub ID.
    pub target_sub_id: Option<String>,
}

impl SessionId {
    /// Creates a new session ID.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            sender_sub_id: None,
            target_sub_id: None,
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

/// Lifecycle state of a registered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionStatus {
    /// Logon sent, no verified counterparty response yet.
    Pending = 0,
    /// Logon exchange verified.
    Established = 1,
    /// Closed after a protocol violation or teardown. Absorbing.
    Terminated = 2,
}

impl SessionStatus {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Established,
            _ => Self::Terminated,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Established => "established",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Protocol identity and sequence counters of one connection.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    sender_comp_id: CompId,
    sender_location_id: Option<String>,
    target_comp_id: CompId,
    target_location_id: Option<String>,
    timestamp_precision: TimestampPrecision,
    default_appl_ver_id: Option<String>,
    default_appl_ext_id: Option<String>,
    next_outgoing: AtomicU64,
    next_incoming: AtomicU64,
    status: AtomicU8,
}

impl Session {
    /// Returns a builder for a new session.
    #[must_use]
    pub fn builder(
        begin_string: impl Into<String>,
        sender_comp_id: CompId,
        target_comp_id: CompId,
    ) -> SessionBuilder {
        SessionBuilder {
            begin_string: begin_string.into(),
            sender_comp_id,
            sender_sub_id: None,
            sender_location_id: None,
            target_comp_id,
            target_sub_id: None,
            target_location_id: None,
            timestamp_precision: TimestampPrecision::default(),
            default_appl_ver_id: None,
            default_appl_ext_id: None,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the BeginString.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.id.begin_string
    }

    /// Returns the SenderCompID.
    #[must_use]
    pub fn sender_comp_id(&self) -> &CompId {
        &self.sender_comp_id
    }

    /// Returns the SenderSubID.
    #[must_use]
    pub fn sender_sub_id(&self) -> Option<&str> {
        self.id.sender_sub_id.as_deref()
    }

    /// Returns the SenderLocationID.
    #[must_use]
    pub fn sender_location_id(&self) -> Option<&str> {
        self.sender_location_id.as_deref()
    }

    /// Returns the TargetCompID.
    #[must_use]
    pub fn target_comp_id(&self) -> &CompId {
        &self.target_comp_id
    }

    /// Returns the TargetSubID.
    #[must_use]
    pub fn target_sub_id(&self) -> Option<&str> {
        self.id.target_sub_id.as_deref()
    }

    /// Returns the TargetLocationID.
    #[must_use]
    pub fn target_location_id(&self) -> Option<&str> {
        self.target_location_id.as_deref()
    }

    /// Returns the SendingTime precision.
    #[must_use]
    pub const fn timestamp_precision(&self) -> TimestampPrecision {
        self.timestamp_precision
    }

    /// Returns the DefaultApplVerID.
    #[must_use]
    pub fn default_appl_ver_id(&self) -> Option<&str> {
        self.default_appl_ver_id.as_deref()
    }

    /// Returns the DefaultApplExtID.
    #[must_use]
    pub fn default_appl_ext_id(&self) -> Option<&str> {
        self.default_appl_ext_id.as_deref()
    }

    /// Seeds the next outgoing sequence number.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if `seq` is zero.
    pub fn set_next_outgoing_seq_num(&mut self, seq: SeqNum) -> Result<(), SessionError> {
        *self.next_outgoing.get_mut() = checked_seed("outgoing", seq)?;
        Ok(())
    }

    /// Seeds the next expected incoming sequence number.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if `seq` is zero.
    pub fn set_next_incoming_seq_num(&mut self, seq: SeqNum) -> Result<(), SessionError> {
        *self.next_incoming.get_mut() = checked_seed("incoming", seq)?;
        Ok(())
    }

    /// Returns the next sequence number this side will stamp.
    #[inline]
    #[must_use]
    pub fn next_outgoing_seq_num(&self) -> SeqNum {
        SeqNum::new(self.next_outgoing.load(Ordering::SeqCst))
    }

    /// Returns the next sequence number expected from the counterparty.
    #[inline]
    #[must_use]
    pub fn next_incoming_seq_num(&self) -> SeqNum {
        SeqNum::new(self.next_incoming.load(Ordering::SeqCst))
    }

    /// Allocates and returns the next outgoing sequence number.
    #[inline]
    pub fn allocate_outgoing_seq_num(&self) -> SeqNum {
        SeqNum::new(self.next_outgoing.fetch_add(1, Ordering::SeqCst))
    }

    /// Accepts `seq` if it is the expected incoming sequence number.
    ///
    /// Returns true and advances the counter by one in a single atomic step
    /// when `seq` matches; otherwise leaves the counter untouched. A number
    /// with no successor is never accepted.
    pub fn check_and_increment_incoming_seq_num(&self, seq: SeqNum) -> bool {
        let Some(next) = seq.value().checked_add(1) else {
            return false;
        };
        self.next_incoming
            .compare_exchange(
                seq.value(),
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        SessionStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Returns true once the logon exchange has been verified.
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.status() == SessionStatus::Established
    }

    /// Returns true if the session was terminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.status() == SessionStatus::Terminated
    }

    /// Promotes a pending session to established.
    ///
    /// Returns false if the session was not pending, so the promotion happens
    /// at most once.
    pub fn mark_established(&self) -> bool {
        self.status
            .compare_exchange(
                SessionStatus::Pending as u8,
                SessionStatus::Established as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Terminates the session and returns the state it was in.
    pub fn terminate(&self) -> SessionStatus {
        SessionStatus::from_u8(
            self.status
                .swap(SessionStatus::Terminated as u8, Ordering::SeqCst),
        )
    }
}

fn checked_seed(direction: &str, seq: SeqNum) -> Result<u64, SessionError> {
    if seq.is_valid() {
        Ok(seq.value())
    } else {
        Err(SessionError::Configuration(format!(
            "{direction} sequence number must be positive"
        )))
    }
}

/// Builder for the identity part of a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    begin_string: String,
    sender_comp_id: CompId,
    sender_sub_id: Option<String>,
    sender_location_id: Option<String>,
    target_comp_id: CompId,
    target_sub_id: Option<String>,
    target_location_id: Option<String>,
    timestamp_precision: TimestampPrecision,
    default_appl_ver_id: Option<String>,
    default_appl_ext_id: Option<String>,
}

impl SessionBuilder {
    /// Sets the SenderSubID.
    #[must_use]
    pub fn sender_sub_id(mut self, value: Option<String>) -> Self {
        self.sender_sub_id = value;
        self
    }

    /// Sets the SenderLocationID.
    #[must_use]
    pub fn sender_location_id(mut self, value: Option<String>) -> Self {
        self.sender_location_id = value;
        self
    }

    /// Sets the TargetSubID.
    #[must_use]
    pub fn target_sub_id(mut self, value: Option<String>) -> Self {
        self.target_sub_id = value;
        self
    }

    /// Sets the TargetLocationID.
    #[must_use]
    pub fn target_location_id(mut self, value: Option<String>) -> Self {
        self.target_location_id = value;
        self
    }

    /// Sets the SendingTime precision.
    #[must_use]
    pub const fn timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }

    /// Sets the DefaultApplVerID.
    #[must_use]
    pub fn default_appl_ver_id(mut self, value: Option<String>) -> Self {
        self.default_appl_ver_id = value;
        self
    }

    /// Sets the DefaultApplExtID.
    #[must_use]
    pub fn default_appl_ext_id(mut self, value: Option<String>) -> Self {
        self.default_appl_ext_id = value;
        self
    }

    /// Builds a pending session with both counters at 1.
    #[must_use]
    pub fn build(self) -> Session {
        let id = SessionId {
            begin_string: self.begin_string,
            sender_comp_id: self.sender_comp_id.to_string(),
            target_comp_id: self.target_comp_id.to_string(),
            sender_sub_id: self.sender_sub_id,
            target_sub_id: self.target_sub_id,
        };
        Session {
            id,
            sender_comp_id: self.sender_comp_id,
            sender_location_id: self.sender_location_id,
            target_comp_id: self.target_comp_id,
            target_location_id: self.target_location_id,
            timestamp_precision: self.timestamp_precision,
            default_appl_ver_id: self.default_appl_ver_id,
            default_appl_ext_id: self.default_appl_ext_id,
            next_outgoing: AtomicU64::new(1),
            next_incoming: AtomicU64::new(1),
            status: AtomicU8::new(SessionStatus::Pending as u8),
        }
    }
}
