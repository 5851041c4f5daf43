/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Session settings.
//!
//! This module provides the settings a session is created from, and the
//! [`SettingsProvider`] trait the handshake engine reads them through.

use fixlink_core::error::SessionError;
use fixlink_core::types::{CompId, TimestampPrecision};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Source of the identity and logon parameters of a session.
pub trait SettingsProvider: Send + Sync {
    /// FIX version BeginString (e.g., "FIX.4.4" or "FIXT.1.1").
    fn begin_string(&self) -> &str;
    /// SenderCompID (tag 49).
    fn sender_comp_id(&self) -> &CompId;
    /// SenderSubID (tag 50).
    fn sender_sub_id(&self) -> Option<&str>;
    /// SenderLocationID (tag 142).
    fn sender_location_id(&self) -> Option<&str>;
    /// TargetCompID (tag 56).
    fn target_comp_id(&self) -> &CompId;
    /// TargetSubID (tag 57).
    fn target_sub_id(&self) -> Option<&str>;
    /// TargetLocationID (tag 143).
    fn target_location_id(&self) -> Option<&str>;
    /// Heartbeat interval sent in HeartBtInt (tag 108).
    fn heartbeat_interval(&self) -> Duration;
    /// Precision used when stamping SendingTime.
    fn timestamp_precision(&self) -> TimestampPrecision;
    /// DefaultApplVerID (tag 1137).
    fn default_appl_ver_id(&self) -> Option<&str>;
    /// DefaultApplExtID (tag 1407).
    fn default_appl_ext_id(&self) -> Option<&str>;
    /// Whether the expected incoming sequence number restarts at 1 on logon.
    fn reset_seq_num_on_logon(&self) -> bool;
}

/// Settings for a FIX session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// FIX version BeginString.
    pub begin_string: String,
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Optional sender sub ID (tag 50).
    #[serde(default)]
    pub sender_sub_id: Option<String>,
    /// Optional sender location ID (tag 142).
    #[serde(default)]
    pub sender_location_id: Option<String>,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// Optional target sub ID (tag 57).
    #[serde(default)]
    pub target_sub_id: Option<String>,
    /// Optional target location ID (tag 143).
    #[serde(default)]
    pub target_location_id: Option<String>,
    /// Heartbeat interval, in whole seconds on the wire.
    #[serde(with = "duration_secs", default = "default_heartbeat_interval")]
    pub heartbeat_interval: Duration,
    /// SendingTime precision.
    #[serde(default)]
    pub timestamp_precision: TimestampPrecision,
    /// Optional DefaultApplVerID (tag 1137).
    #[serde(default)]
    pub default_appl_ver_id: Option<String>,
    /// Optional DefaultApplExtID (tag 1407).
    #[serde(default)]
    pub default_appl_ext_id: Option<String>,
    /// Whether to restart the expected incoming sequence number at 1 on logon.
    #[serde(default)]
    pub reset_seq_num_on_logon: bool,
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

impl SessionSettings {
    /// Creates new session settings with required fields.
    ///
    /// # Arguments
    /// * `sender_comp_id` - The sender CompID
    /// * `target_comp_id` - The target CompID
    /// * `begin_string` - The FIX version string
    #[must_use]
    pub fn new(
        sender_comp_id: CompId,
        target_comp_id: CompId,
        begin_string: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id,
            sender_sub_id: None,
            sender_location_id: None,
            target_comp_id,
            target_sub_id: None,
            target_location_id: None,
            heartbeat_interval: default_heartbeat_interval(),
            timestamp_precision: TimestampPrecision::default(),
            default_appl_ver_id: None,
            default_appl_ext_id: None,
            reset_seq_num_on_logon: false,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets whether to reset the incoming sequence number on logon.
    #[must_use]
    pub const fn with_reset_seq_num_on_logon(mut self, reset: bool) -> Self {
        self.reset_seq_num_on_logon = reset;
        self
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the sender location ID.
    #[must_use]
    pub fn with_sender_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.sender_location_id = Some(location_id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    /// Sets the target location ID.
    #[must_use]
    pub fn with_target_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.target_location_id = Some(location_id.into());
        self
    }

    /// Sets the SendingTime precision.
    #[must_use]
    pub const fn with_timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }

    /// Sets the DefaultApplVerID.
    #[must_use]
    pub fn with_default_appl_ver_id(mut self, id: impl Into<String>) -> Self {
        self.default_appl_ver_id = Some(id.into());
        self
    }

    /// Sets the DefaultApplExtID.
    #[must_use]
    pub fn with_default_appl_ext_id(mut self, id: impl Into<String>) -> Self {
        self.default_appl_ext_id = Some(id.into());
        self
    }

    /// Checks that the settings can start a session.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if the BeginString or a CompID is
    /// empty, or if the heartbeat interval is shorter than one second.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.begin_string.trim().is_empty() {
            return Err(SessionError::Configuration(
                "begin_string must not be empty".to_string(),
            ));
        }
        if self.sender_comp_id.is_empty() || self.target_comp_id.is_empty() {
            return Err(SessionError::Configuration(
                "sender and target CompIDs must not be empty".to_string(),
            ));
        }
        if self.heartbeat_interval.as_secs() == 0 {
            return Err(SessionError::Configuration(
                "heartbeat interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsProvider for SessionSettings {
    fn begin_string(&self) -> &str {
        &self.begin_string
    }

    fn sender_comp_id(&self) -> &CompId {
        &self.sender_comp_id
    }

    fn sender_sub_id(&self) -> Option<&str> {
        self.sender_sub_id.as_deref()
    }

    fn sender_location_id(&self) -> Option<&str> {
        self.sender_location_id.as_deref()
    }

    fn target_comp_id(&self) -> &CompId {
        &self.target_comp_id
    }

    fn target_sub_id(&self) -> Option<&str> {
        self.target_sub_id.as_deref()
    }

    fn target_location_id(&self) -> Option<&str> {
        self.target_location_id.as_deref()
    }

    fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    fn timestamp_precision(&self) -> TimestampPrecision {
        self.timestamp_precision
    }

    fn default_appl_ver_id(&self) -> Option<&str> {
        self.default_appl_ver_id.as_deref()
    }

    fn default_appl_ext_id(&self) -> Option<&str> {
        self.default_appl_ext_id.as_deref()
    }

    fn reset_seq_num_on_logon(&self) -> bool {
        self.reset_seq_num_on_logon
    }
}

/// Builder for session settings.
#[derive(Debug, Default)]
pub struct SessionSettingsBuilder {
    sender_comp_id: Option<CompId>,
    sender_sub_id: Option<String>,
    sender_location_id: Option<String>,
    target_comp_id: Option<CompId>,
    target_sub_id: Option<String>,
    target_location_id: Option<String>,
    begin_string: Option<String>,
    heartbeat_interval: Option<Duration>,
    timestamp_precision: Option<TimestampPrecision>,
    default_appl_ver_id: Option<String>,
    default_appl_ext_id: Option<String>,
    reset_seq_num_on_logon: bool,
}

impl SessionSettingsBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: CompId) -> Self {
        self.sender_comp_id = Some(id);
        self
    }

    /// Sets the SenderSubID.
    #[must_use]
    pub fn sender_sub_id(mut self, id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(id.into());
        self
    }

    /// Sets the SenderLocationID.
    #[must_use]
    pub fn sender_location_id(mut self, id: impl Into<String>) -> Self {
        self.sender_location_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: CompId) -> Self {
        self.target_comp_id = Some(id);
        self
    }

    /// Sets the TargetSubID.
    #[must_use]
    pub fn target_sub_id(mut self, id: impl Into<String>) -> Self {
        self.target_sub_id = Some(id.into());
        self
    }

    /// Sets the TargetLocationID.
    #[must_use]
    pub fn target_location_id(mut self, id: impl Into<String>) -> Self {
        self.target_location_id = Some(id.into());
        self
    }

    /// Sets the FIX version.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the SendingTime precision.
    #[must_use]
    pub fn timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = Some(precision);
        self
    }

    /// Sets the DefaultApplVerID.
    #[must_use]
    pub fn default_appl_ver_id(mut self, id: impl Into<String>) -> Self {
        self.default_appl_ver_id = Some(id.into());
        self
    }

    /// Sets the DefaultApplExtID.
    #[must_use]
    pub fn default_appl_ext_id(mut self, id: impl Into<String>) -> Self {
        self.default_appl_ext_id = Some(id.into());
        self
    }

    /// Sets whether to reset the incoming sequence number on logon.
    #[must_use]
    pub const fn reset_seq_num_on_logon(mut self, reset: bool) -> Self {
        self.reset_seq_num_on_logon = reset;
        self
    }

    /// Builds and validates the settings.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if a CompID is missing or the
    /// resulting settings fail [`SessionSettings::validate`].
    pub fn build(self) -> Result<SessionSettings, SessionError> {
        let sender = self
            .sender_comp_id
            .ok_or_else(|| SessionError::Configuration("sender_comp_id is required".into()))?;
        let target = self
            .target_comp_id
            .ok_or_else(|| SessionError::Configuration("target_comp_id is required".into()))?;
        let begin_string = self.begin_string.unwrap_or_else(|| "FIX.4.4".to_string());

        let mut settings = SessionSettings::new(sender, target, begin_string);
        if let Some(interval) = self.heartbeat_interval {
            settings.heartbeat_interval = interval;
        }
        if let Some(precision) = self.timestamp_precision {
            settings.timestamp_precision = precision;
        }
        settings.sender_sub_id = self.sender_sub_id;
        settings.sender_location_id = self.sender_location_id;
        settings.target_sub_id = self.target_sub_id;
        settings.target_location_id = self.target_location_id;
        settings.default_appl_ver_id = self.default_appl_ver_id;
        settings.default_appl_ext_id = self.default_appl_ext_id;
        settings.reset_seq_num_on_logon = self.reset_seq_num_on_logon;

        settings.validate()?;
        Ok(settings)
    }
}
