/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # FixLink Engine
//!
//! Async driver for the FixLink session handshake.
//!
//! This crate provides:
//! - **Engine**: One worker task per connection, inbound messages in arrival order
//! - **Application trait**: Callback interface for forwarded messages and errors
//! - **Builder API**: Fluent configuration for engine setup

pub mod application;
pub mod builder;
pub mod engine;

pub use application::{Application, ErrorAction, NoOpApplication};
pub use builder::EngineBuilder;
pub use engine::Engine;
