/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Construction of the administrative messages the handshake sends.
//!
//! Both builders return unstamped messages; the header is filled in by
//! [`crate::outbound::prepare_message_to_send`].

use crate::credentials::CredentialProvider;
use crate::session::Session;
use fixlink_core::field::tags;
use fixlink_core::message::{FixMessage, MsgType};
use fixlink_core::types::{SeqNum, is_newest_major_revision};
use std::time::Duration;

/// EncryptMethod (98) value for "None / other".
pub const ENCRYPT_METHOD_NONE: i64 = 0;

/// Builds a Logon request for `session`.
///
/// HeartBtInt and EncryptMethod are always present. Username and Password are
/// attached only when `credentials` yields a value. On a FIXT session the
/// DefaultApplVerID is attached, and DefaultApplExtID too when it is set and
/// non-empty.
#[must_use]
pub fn build_logon_request(
    session: &Session,
    heartbeat_interval: Duration,
    credentials: Option<&dyn CredentialProvider>,
) -> FixMessage {
    let mut logon = FixMessage::new(MsgType::Logon)
        .with_field(tags::HEART_BT_INT, heartbeat_interval.as_secs())
        .with_field(tags::ENCRYPT_METHOD, ENCRYPT_METHOD_NONE);

    if let Some(creds) = credentials.and_then(|provider| provider.credentials()) {
        logon.add_field(tags::USERNAME, creds.username());
        logon.add_field(tags::PASSWORD, creds.password());
    }

    if is_newest_major_revision(session.begin_string()) {
        if let Some(appl_ver_id) = session.default_appl_ver_id() {
            logon.add_field(tags::DEFAULT_APPL_VER_ID, appl_ver_id);
        }
        if let Some(appl_ext_id) = session.default_appl_ext_id().filter(|id| !id.is_empty()) {
            logon.add_field(tags::DEFAULT_APPL_EXT_ID, appl_ext_id);
        }
    }

    logon
}

/// Builds a Resend Request for the inclusive range `begin..=end`.
#[must_use]
pub fn build_resend_request(begin: SeqNum, end: SeqNum) -> FixMessage {
    FixMessage::new(MsgType::ResendRequest)
        .with_field(tags::BEGIN_SEQ_NO, begin.value())
        .with_field(tags::END_SEQ_NO, end.value())
}
