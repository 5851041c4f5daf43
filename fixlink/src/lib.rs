/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # FixLink
//!
//! The session layer of a FIX engine: logon handshake and sequence integrity.
//!
//! FixLink establishes a session over any transport that can hand it decoded
//! messages, verifies the counterparty's Logon, and polices sequence numbers
//! for the lifetime of the connection.
//!
//! ## Features
//!
//! - **Verified handshake**: A session is established only after a Logon whose
//!   sequence number matches the expected one
//! - **Gap recovery trigger**: A sequence gap sends a Resend Request instead of failing
//! - **Regression shutdown**: A sequence number going backwards closes the connection
//! - **Async driver**: One Tokio task per connection, messages in arrival order
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixlink::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_application(MyApplication)
//!     .with_settings(SessionSettings::new(
//!         CompId::new("SENDER").unwrap(),
//!         CompId::new("TARGET").unwrap(),
//!         "FIX.4.4",
//!     ))
//!     .build()?;
//! let worker = engine.spawn_connection(connection, inbound);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Errors, value types, fields and structured messages
//! - [`store`]: Persisted sequence numbers
//! - [`session`]: Session entity and handshake engine
//! - [`engine`]: Per-connection async driver

pub mod core {
    //! Errors, value types, fields and structured messages.
    pub use fixlink_core::*;
}

pub mod store {
    //! Persisted sequence numbers.
    pub use fixlink_store::*;
}

pub mod session {
    //! Session entity and handshake engine.
    pub use fixlink_session::*;
}

pub mod engine {
    //! Per-connection async driver.
    pub use fixlink_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixlink_core::{
        CompId, FieldValue, FixError, FixMessage, MsgType, Result, SeqNum, SessionError,
        StoreError, Timestamp, TimestampPrecision, tags,
    };

    // Store
    pub use fixlink_store::{MemorySequenceStore, SequenceProvider};

    // Session
    pub use fixlink_session::{
        ChannelConnection, Connection, ConnectionId, CredentialProvider, Credentials,
        Disposition, EventSink, Initiator, MemorySessionStore, Outbound, Session, SessionEvent,
        SessionId, SessionRole, SessionSettings, SessionStatus, SessionStore, SettingsProvider,
    };

    // Engine
    pub use fixlink_engine::{Application, Engine, EngineBuilder, ErrorAction};
}
