/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Send preparation shared by every outbound message.

use crate::session::Session;
use fixlink_core::message::FixMessage;
use fixlink_core::types::Timestamp;

/// Stamps session identity, the next outgoing sequence number and SendingTime
/// onto `message`.
///
/// Allocating the sequence number advances the session's outgoing counter.
pub fn prepare_message_to_send(session: &Session, message: &mut FixMessage) {
    prepare_message_to_send_at(session, message, Timestamp::now());
}

/// Same as [`prepare_message_to_send`] with an explicit SendingTime.
pub fn prepare_message_to_send_at(session: &Session, message: &mut FixMessage, now: Timestamp) {
    let header = message.header_mut();
    header.begin_string = Some(session.begin_string().to_string());
    header.sender_comp_id = Some(session.sender_comp_id().to_string());
    header.sender_sub_id = session.sender_sub_id().map(String::from);
    header.sender_location_id = session.sender_location_id().map(String::from);
    header.target_comp_id = Some(session.target_comp_id().to_string());
    header.target_sub_id = session.target_sub_id().map(String::from);
    header.target_location_id = session.target_location_id().map(String::from);
    header.sending_time = Some(now.format(session.timestamp_precision()));
    header.msg_seq_num = Some(session.allocate_outgoing_seq_num());
}
