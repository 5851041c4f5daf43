/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # FixLink Core
//!
//! Core types, messages, and error definitions for the FixLink FIX session layer.
//!
//! This crate provides the building blocks shared by every FixLink crate:
//! - **Error types**: Session and store errors with `thiserror`
//! - **Field types**: Session-level tag numbers and `FieldValue`
//! - **Message types**: `MsgType`, `MessageHeader`, and the structured `FixMessage`
//! - **Core types**: `SeqNum`, `CompId`, `Timestamp`, `TimestampPrecision`
//!
//! Wire encoding is not part of this crate: a `FixMessage` is the structured,
//! tag-addressed form that codecs produce and consume.

pub mod error;
pub mod field;
pub mod message;
pub mod types;

pub use error::{FixError, Result, SessionError, StoreError};
pub use field::{FieldValue, tags};
pub use message::{FixMessage, MessageHeader, MsgType};
pub use types::{
    CompId, DEFAULT_APPL_VER_ID, FIXT_1_1, SeqNum, Timestamp, TimestampPrecision,
    is_newest_major_revision,
};
