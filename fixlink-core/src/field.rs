/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Field tags and values for FIX session messages.
//!
//! This module provides:
//! - [`tags`]: Tag numbers of the header and session-level fields FixLink touches
//! - [`FieldValue`]: Enumeration of possible field value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag numbers of the fields used by the session layer.
pub mod tags {
    /// BeginSeqNo (7).
    pub const BEGIN_SEQ_NO: u32 = 7;
    /// BeginString (8).
    pub const BEGIN_STRING: u32 = 8;
    /// EndSeqNo (16).
    pub const END_SEQ_NO: u32 = 16;
    /// MsgSeqNum (34).
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType (35).
    pub const MSG_TYPE: u32 = 35;
    /// SenderCompID (49).
    pub const SENDER_COMP_ID: u32 = 49;
    /// SenderSubID (50).
    pub const SENDER_SUB_ID: u32 = 50;
    /// SendingTime (52).
    pub const SENDING_TIME: u32 = 52;
    /// TargetCompID (56).
    pub const TARGET_COMP_ID: u32 = 56;
    /// TargetSubID (57).
    pub const TARGET_SUB_ID: u32 = 57;
    /// EncryptMethod (98).
    pub const ENCRYPT_METHOD: u32 = 98;
    /// HeartBtInt (108).
    pub const HEART_BT_INT: u32 = 108;
    /// SenderLocationID (142).
    pub const SENDER_LOCATION_ID: u32 = 142;
    /// TargetLocationID (143).
    pub const TARGET_LOCATION_ID: u32 = 143;
    /// Username (553).
    pub const USERNAME: u32 = 553;
    /// Password (554).
    pub const PASSWORD: u32 = 554;
    /// DefaultApplVerID (1137).
    pub const DEFAULT_APPL_VER_ID: u32 = 1137;
    /// DefaultApplExtID (1407).
    pub const DEFAULT_APPL_EXT_ID: u32 = 1407;
}

/// Enumeration of possible FIX field value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Boolean value (Y/N).
    Bool(bool),
    /// Single character value.
    Char(char),
}

impl FieldValue {
    /// Returns the value as a string, if it is a String variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a u64.
    ///
    /// Integer variants are converted when non-negative and string variants
    /// are parsed, since decoded messages carry their values as text.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as an i64, parsing string variants.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", if *v { "Y" } else { "N" }),
            Self::Char(c) => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("test").to_string(), "test");
        assert_eq!(FieldValue::Int(-42).to_string(), "-42");
        assert_eq!(FieldValue::UInt(42).to_string(), "42");
        assert_eq!(FieldValue::Bool(true).to_string(), "Y");
        assert_eq!(FieldValue::Bool(false).to_string(), "N");
        assert_eq!(FieldValue::Char('A').to_string(), "A");
    }

    #[test]
    fn test_field_value_numeric_access() {
        assert_eq!(FieldValue::from("17").as_u64(), Some(17));
        assert_eq!(FieldValue::Int(3).as_u64(), Some(3));
        assert_eq!(FieldValue::Int(-3).as_u64(), None);
        assert_eq!(FieldValue::from("abc").as_u64(), None);
        assert_eq!(FieldValue::UInt(30).as_i64(), Some(30));
        assert_eq!(FieldValue::Bool(true).as_i64(), None);
    }
}
