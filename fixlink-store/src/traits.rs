/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Sequence provider trait definition.
//!
//! This module defines the interface a session consults at creation time to
//! seed its sequence counters from persisted state.

use fixlink_core::error::StoreError;
use fixlink_core::types::SeqNum;

/// Source of the last persisted sequence numbers of a session.
///
/// Implementations own the storage format. The session layer only reads the
/// counters when a connection is activated.
pub trait SequenceProvider: Send + Sync {
    /// Returns the next sequence number this side will stamp on an outbound message.
    ///
    /// # Errors
    /// Returns `StoreError` if the counter cannot be read or is not a valid
    /// sequence number.
    fn persisted_outgoing_seq_num(&self) -> Result<SeqNum, StoreError>;

    /// Returns the next sequence number expected from the counterparty.
    ///
    /// # Errors
    /// Returns `StoreError` if the counter cannot be read or is not a valid
    /// sequence number.
    fn persisted_incoming_seq_num(&self) -> Result<SeqNum, StoreError>;
}
