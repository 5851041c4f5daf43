/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! # FixLink Store
//!
//! Persisted sequence number storage for the FixLink FIX session layer.
//!
//! This crate provides:
//! - **SequenceProvider trait**: Source of the last persisted sequence counters
//! - **MemorySequenceStore**: In-memory counters for testing and simple use cases

pub mod memory;
pub mod traits;

pub use memory::MemorySequenceStore;
pub use traits::SequenceProvider;
