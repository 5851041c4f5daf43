/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Message types for the FIX session layer.
//!
//! This module provides:
//! - [`MsgType`]: Enumeration of FIX message types
//! - [`MessageHeader`]: Standard header fields stamped by the session layer
//! - [`FixMessage`]: Structured, tag-addressed message used in both directions
//!
//! A [`FixMessage`] is what a codec hands to the session layer after decoding,
//! and what the session layer hands back for encoding. Body fields keep their
//! insertion order.

use crate::field::{FieldValue, tags};
use crate::types::SeqNum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX message types.
///
/// The administrative types are named; business types that the session layer
/// only passes through are carried as `Custom(String)` unless listed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Logon (A) - Session level.
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "A" => Self::Logon,
            "D" => Self::NewOrderSingle,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the string representation of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard header of a FIX message.
///
/// Outbound messages leave everything but `msg_type` empty until the
/// send-preparation step stamps them. Decoded inbound messages carry
/// whatever the counterparty sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageHeader {
    /// BeginString (tag 8).
    pub begin_string: Option<String>,
    /// MsgType (tag 35).
    pub msg_type: MsgType,
    /// MsgSeqNum (tag 34).
    pub msg_seq_num: Option<SeqNum>,
    /// SenderCompID (tag 49).
    pub sender_comp_id: Option<String>,
    /// SenderSubID (tag 50).
    pub sender_sub_id: Option<String>,
    /// SenderLocationID (tag 142).
    pub sender_location_id: Option<String>,
    /// TargetCompID (tag 56).
    pub target_comp_id: Option<String>,
    /// TargetSubID (tag 57).
    pub target_sub_id: Option<String>,
    /// TargetLocationID (tag 143).
    pub target_location_id: Option<String>,
    /// SendingTime (tag 52), already formatted.
    pub sending_time: Option<String>,
}

impl MessageHeader {
    /// Creates a header with only the message type set.
    #[must_use]
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            ..Self::default()
        }
    }
}

/// Structured FIX message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixMessage {
    header: MessageHeader,
    fields: Vec<(u32, FieldValue)>,
}

impl FixMessage {
    /// Creates an empty message of the given type.
    #[must_use]
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            header: MessageHeader::new(msg_type),
            fields: Vec::new(),
        }
    }

    /// Appends a body field and returns the message.
    #[must_use]
    pub fn with_field(mut self, tag: u32, value: impl Into<FieldValue>) -> Self {
        self.add_field(tag, value);
        self
    }

    /// Sets MsgSeqNum and returns the message.
    #[must_use]
    pub fn with_msg_seq_num(mut self, seq: impl Into<SeqNum>) -> Self {
        self.header.msg_seq_num = Some(seq.into());
        self
    }

    /// Appends a body field.
    pub fn add_field(&mut self, tag: u32, value: impl Into<FieldValue>) {
        self.fields.push((tag, value.into()));
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub fn msg_type(&self) -> &MsgType {
        &self.header.msg_type
    }

    /// Returns the MsgSeqNum, if stamped.
    #[inline]
    #[must_use]
    pub fn msg_seq_num(&self) -> Option<SeqNum> {
        self.header.msg_seq_num
    }

    /// Returns the header.
    #[inline]
    #[must_use]
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Returns the header for stamping.
    #[inline]
    pub fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    /// Gets the first body field with the given tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldValue> {
        self.fields.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }

    /// Gets a body field as a string slice.
    #[must_use]
    pub fn get_field_str(&self, tag: u32) -> Option<&str> {
        self.get_field(tag).and_then(FieldValue::as_str)
    }

    /// Gets a body field as a u64.
    #[must_use]
    pub fn get_field_u64(&self, tag: u32) -> Option<u64> {
        self.get_field(tag).and_then(FieldValue::as_u64)
    }

    /// Returns true if the body contains the given tag.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.get_field(tag).is_some()
    }

    /// Returns the number of body fields.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Renders the message as `tag=value|` pairs for logging.
///
/// Password (554) is masked.
impl fmt::Display for FixMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        if let Some(begin_string) = &h.begin_string {
            write!(f, "{}={}|", tags::BEGIN_STRING, begin_string)?;
        }
        write!(f, "{}={}|", tags::MSG_TYPE, h.msg_type)?;
        if let Some(seq) = h.msg_seq_num {
            write!(f, "{}={}|", tags::MSG_SEQ_NUM, seq)?;
        }
        let optional = [
            (tags::SENDER_COMP_ID, &h.sender_comp_id),
            (tags::SENDER_SUB_ID, &h.sender_sub_id),
            (tags::SENDING_TIME, &h.sending_time),
            (tags::TARGET_COMP_ID, &h.target_comp_id),
            (tags::TARGET_SUB_ID, &h.target_sub_id),
            (tags::SENDER_LOCATION_ID, &h.sender_location_id),
            (tags::TARGET_LOCATION_ID, &h.target_location_id),
        ];
        for (tag, value) in optional {
            if let Some(value) = value {
                write!(f, "{}={}|", tag, value)?;
            }
        }
        for (tag, value) in &self.fields {
            if *tag == tags::PASSWORD {
                write!(f, "{}=****|", tag)?;
            } else {
                write!(f, "{}={}|", tag, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msg_type_round_trip_known() {
        assert_eq!("A".parse::<MsgType>().unwrap(), MsgType::Logon);
        assert_eq!("2".parse::<MsgType>().unwrap(), MsgType::ResendRequest);
        assert_eq!(MsgType::Logon.as_str(), "A");
        assert_eq!(MsgType::ResendRequest.as_str(), "2");
    }

    #[test]
    fn test_msg_type_custom() {
        let custom: MsgType = "XX".parse().unwrap();
        assert!(matches!(custom, MsgType::Custom(_)));
        assert_eq!(custom.as_str(), "XX");
        assert!(custom.is_app());
    }

    #[test]
    fn test_msg_type_is_admin() {
        assert!(MsgType::Logon.is_admin());
        assert!(MsgType::ResendRequest.is_admin());
        assert!(!MsgType::NewOrderSingle.is_admin());
    }

    #[test]
    fn test_message_field_access() {
        let msg = FixMessage::new(MsgType::ResendRequest)
            .with_field(tags::BEGIN_SEQ_NO, 5u64)
            .with_field(tags::END_SEQ_NO, "7")
            .with_msg_seq_num(3);

        assert_eq!(msg.msg_type(), &MsgType::ResendRequest);
        assert_eq!(msg.msg_seq_num(), Some(SeqNum::new(3)));
        assert_eq!(msg.get_field_u64(tags::BEGIN_SEQ_NO), Some(5));
        assert_eq!(msg.get_field_u64(tags::END_SEQ_NO), Some(7));
        assert!(!msg.contains(tags::USERNAME));
        assert_eq!(msg.field_count(), 2);
    }

    #[test]
    fn test_message_display_masks_password() {
        let msg = FixMessage::new(MsgType::Logon)
            .with_field(tags::USERNAME, "user")
            .with_field(tags::PASSWORD, "secret");
        let rendered = msg.to_string();

        assert!(rendered.starts_with("35=A|"));
        assert!(rendered.contains("553=user|"));
        assert!(rendered.contains("554=****|"));
        assert!(!rendered.contains("secret"));
    }
}
