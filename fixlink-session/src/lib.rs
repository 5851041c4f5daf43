/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # FixLink Session
//!
//! FIX session handshake and sequence integrity for the FixLink engine.
//!
//! This crate provides:
//! - **Session**: Per-connection identity and atomic sequence counters
//! - **Handshake**: Logon construction and verification through [`SessionRole`]
//! - **Sequence checks**: Gap detection with Resend Request, regression shutdown
//! - **Session store**: Concurrent connection to session association
//! - **Configuration**: Session settings and credential providers

pub mod admin;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod event;
pub mod initiator;
pub mod outbound;
pub mod registry;
pub mod role;
pub mod sequence;
pub mod session;

pub use admin::{build_logon_request, build_resend_request};
pub use config::{SessionSettings, SessionSettingsBuilder, SettingsProvider};
pub use connection::{ChannelConnection, Connection, ConnectionId, Outbound};
pub use credentials::{CredentialProvider, Credentials};
pub use event::{EventSink, NoOpEventSink, SessionEvent};
pub use initiator::Initiator;
pub use outbound::{prepare_message_to_send, prepare_message_to_send_at};
pub use registry::{MemorySessionStore, SessionStore};
pub use role::{Disposition, SessionRole};
pub use sequence::{SequenceCheck, SequenceOutcome, check_incoming, enforce_sequence};
pub use session::{Session, SessionBuilder, SessionId, SessionStatus};
