/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! In-memory sequence store implementation.
//!
//! This module provides sequence counters held in process memory, suitable
//! for testing and for sessions that reset on every logon.

use crate::traits::SequenceProvider;
use fixlink_core::error::StoreError;
use fixlink_core::types::SeqNum;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// In-memory persisted sequence counters.
///
/// Not persistent across processes: all counters are lost when the process exits.
#[derive(Debug)]
pub struct MemorySequenceStore {
    /// Next outgoing sequence number.
    next_outgoing: AtomicU64,
    /// Next expected incoming sequence number.
    next_incoming: AtomicU64,
}

impl MemorySequenceStore {
    /// Creates a new store with both counters at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial_seqs(1, 1)
    }

    /// Creates a new store with initial sequence numbers.
    ///
    /// # Arguments
    /// * `outgoing` - Next outgoing sequence number
    /// * `incoming` - Next expected incoming sequence number
    #[must_use]
    pub fn with_initial_seqs(outgoing: u64, incoming: u64) -> Self {
        Self {
            next_outgoing: AtomicU64::new(outgoing),
            next_incoming: AtomicU64::new(incoming),
        }
    }

    /// Records the next outgoing sequence number.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidSequence` if `seq` is zero.
    pub fn record_outgoing(&self, seq: u64) -> Result<(), StoreError> {
        let seq = validate("outgoing", seq)?;
        self.next_outgoing.store(seq.value(), Ordering::SeqCst);
        Ok(())
    }

    /// Records the next expected incoming sequence number.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidSequence` if `seq` is zero.
    pub fn record_incoming(&self, seq: u64) -> Result<(), StoreError> {
        let seq = validate("incoming", seq)?;
        self.next_incoming.store(seq.value(), Ordering::SeqCst);
        Ok(())
    }

    /// Resets both counters to 1.
    pub fn reset(&self) {
        debug!("resetting persisted sequence numbers");
        self.next_outgoing.store(1, Ordering::SeqCst);
        self.next_incoming.store(1, Ordering::SeqCst);
    }
}

impl Default for MemorySequenceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(direction: &'static str, value: u64) -> Result<SeqNum, StoreError> {
    let seq = SeqNum::new(value);
    if seq.is_valid() {
        Ok(seq)
    } else {
        Err(StoreError::InvalidSequence { direction, value })
    }
}

impl SequenceProvider for MemorySequenceStore {
    fn persisted_outgoing_seq_num(&self) -> Result<SeqNum, StoreError> {
        validate("outgoing", self.next_outgoing.load(Ordering::SeqCst))
    }

    fn persisted_incoming_seq_num(&self) -> Result<SeqNum, StoreError> {
        validate("incoming", self.next_incoming.load(Ordering::SeqCst))
    }
}
