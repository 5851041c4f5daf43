/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Core types for FIX session operations.
//!
//! This module provides fundamental types used throughout FixLink:
//! - [`SeqNum`]: Sequence number wrapper
//! - [`Timestamp`]: UTC timestamp rendered at a configurable [`TimestampPrecision`]
//! - [`CompId`]: Component identifier (SenderCompID, TargetCompID)

use arrayvec::ArrayString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompID strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// BeginString of the newest supported major revision (FIX 5.0 and later over FIXT).
pub const FIXT_1_1: &str = "FIXT.1.1";

/// DefaultApplVerID used when a FIXT session has none configured ("7" = FIX 5.0).
pub const DEFAULT_APPL_VER_ID: &str = "7";

/// Returns true if `begin_string` denotes the newest supported major revision.
///
/// The comparison is ASCII case-insensitive.
#[must_use]
pub fn is_newest_major_revision(begin_string: &str) -> bool {
    begin_string.eq_ignore_ascii_case(FIXT_1_1)
}

/// FIX message sequence number.
///
/// Valid sequence numbers start at 1 and advance by one per message in each
/// direction of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Checks if this sequence number is valid (>= 1).
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u64 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fractional-second precision used when stamping SendingTime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    /// Whole seconds: `YYYYMMDD-HH:MM:SS`.
    Seconds,
    /// Milliseconds: `YYYYMMDD-HH:MM:SS.sss`.
    #[default]
    Millis,
    /// Microseconds: `YYYYMMDD-HH:MM:SS.ssssss`.
    Micros,
    /// Nanoseconds: `YYYYMMDD-HH:MM:SS.sssssssss`.
    Nanos,
}

impl TimestampPrecision {
    const fn format_str(self) -> &'static str {
        match self {
            Self::Seconds => "%Y%m%d-%H:%M:%S",
            Self::Millis => "%Y%m%d-%H:%M:%S%.3f",
            Self::Micros => "%Y%m%d-%H:%M:%S%.6f",
            Self::Nanos => "%Y%m%d-%H:%M:%S%.9f",
        }
    }
}

/// UTC timestamp with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Nanoseconds since Unix epoch (1970-01-01 00:00:00 UTC).
    nanos_since_epoch: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            nanos_since_epoch: nanos,
        }
    }

    /// Creates a timestamp from milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos_since_epoch: millis * 1_000_000,
        }
    }

    /// Returns the current UTC timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.nanos_since_epoch as i64)
    }

    /// Formats the timestamp as a FIX UTCTimestamp at the given precision.
    #[must_use]
    pub fn format(self, precision: TimestampPrecision) -> String {
        self.to_datetime().format(precision.format_str()).to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            nanos_since_epoch: dt.timestamp_nanos_opt().unwrap_or(0) as u64,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(TimestampPrecision::Millis))
    }
}

/// Component identifier for FIX sessions.
///
/// Used for SenderCompID (tag 49) and TargetCompID (tag 56).
/// Maximum length is 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Returns
    /// `Some(CompId)` if the string fits within the maximum length, `None` otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if the CompId is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_num_operations() {
        let seq = SeqNum::new(5);
        assert_eq!(seq.value(), 5);
        assert!(seq.is_valid());
        assert!(!SeqNum::new(0).is_valid());
        assert_eq!(SeqNum::default().value(), 1);
    }

    #[test]
    fn test_newest_major_revision() {
        assert!(is_newest_major_revision("FIXT.1.1"));
        assert!(is_newest_major_revision("fixt.1.1"));
        assert!(!is_newest_major_revision("FIX.4.4"));
        assert!(!is_newest_major_revision(""));
    }

    #[test]
    fn test_timestamp_format_precisions() {
        let ts = Timestamp::from_nanos(1_500_000_123);
        assert_eq!(ts.format(TimestampPrecision::Seconds), "19700101-00:00:01");
        assert_eq!(ts.format(TimestampPrecision::Millis), "19700101-00:00:01.500");
        assert_eq!(
            ts.format(TimestampPrecision::Micros),
            "19700101-00:00:01.500000"
        );
        assert_eq!(
            ts.format(TimestampPrecision::Nanos),
            "19700101-00:00:01.500000123"
        );
    }

    #[test]
    fn test_timestamp_precision_serde() {
        let p: TimestampPrecision = serde_json::from_str("\"micros\"").unwrap();
        assert_eq!(p, TimestampPrecision::Micros);
        assert_eq!(TimestampPrecision::default(), TimestampPrecision::Millis);
    }

    #[test]
    fn test_comp_id() {
        let id = CompId::new("SENDER").unwrap();
        assert_eq!(id.as_str(), "SENDER");
        assert!(!id.is_empty());
        assert!(CompId::new(&"A".repeat(COMP_ID_MAX_LEN + 1)).is_none());
        assert!("TARGET".parse::<CompId>().is_ok());
    }
}
