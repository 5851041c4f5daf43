/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Error types for the FixLink session layer.
//!
//! Errors are split by the layer that raises them. [`SessionError`] covers the
//! handshake and sequence-integrity state machine, [`StoreError`] covers the
//! persisted sequence counters.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FixLink operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in sequence store operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by the session handshake and sequence checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A message arrived that the current session state does not allow.
    ///
    /// Not retried automatically; the caller decides what happens to the
    /// connection.
    #[error("protocol state violation: {0}")]
    ProtocolState(String),

    /// The counterparty sent a sequence number lower than expected.
    ///
    /// The connection has already been closed when this is returned.
    #[error("sequence too low: expected {expected}, received {received}")]
    SequenceRegression {
        /// Next expected incoming sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// The session was terminated and accepts no further messages.
    #[error("session terminated")]
    Terminated,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Creates a [`SessionError::ProtocolState`] error.
    #[must_use]
    pub fn protocol_state(reason: impl Into<String>) -> Self {
        Self::ProtocolState(reason.into())
    }

    /// Returns true if no session can continue on the connection after this error.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SequenceRegression { .. } | Self::Terminated)
    }
}

/// Errors in sequence store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A persisted sequence number is not a valid FIX sequence number.
    #[error("invalid persisted sequence number for {direction}: {value}")]
    InvalidSequence {
        /// Direction of the counter ("incoming" or "outgoing").
        direction: &'static str,
        /// The offending value.
        value: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::SequenceRegression {
            expected: 5,
            received: 3,
        };
        assert_eq!(err.to_string(), "sequence too low: expected 5, received 3");

        let err = SessionError::protocol_state("duplicate logon on established session");
        assert_eq!(
            err.to_string(),
            "protocol state violation: duplicate logon on established session"
        );
    }

    #[test]
    fn test_session_error_is_fatal() {
        assert!(
            SessionError::SequenceRegression {
                expected: 2,
                received: 1
            }
            .is_fatal()
        );
        assert!(SessionError::Terminated.is_fatal());
        assert!(!SessionError::protocol_state("x").is_fatal());
        assert!(!SessionError::Configuration("x".into()).is_fatal());
    }

    #[test]
    fn test_fix_error_from_session() {
        let fix_err: FixError = SessionError::Terminated.into();
        assert!(matches!(fix_err, FixError::Session(SessionError::Terminated)));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::InvalidSequence {
            direction: "incoming",
            value: 0,
        };
        assert_eq!(
            err.to_string(),
            "invalid persisted sequence number for incoming: 0"
        );
    }
}
