/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Engine builder for fluent configuration.
//!
//! This module provides a builder API for wiring an initiator engine to its
//! providers and application.

use crate::application::{Application, NoOpApplication};
use crate::engine::Engine;
use fixlink_core::error::SessionError;
use fixlink_session::config::SessionSettings;
use fixlink_session::credentials::CredentialProvider;
use fixlink_session::event::{EventSink, NoOpEventSink};
use fixlink_session::initiator::Initiator;
use fixlink_session::registry::{MemorySessionStore, SessionStore};
use fixlink_store::{MemorySequenceStore, SequenceProvider};
use std::fmt;
use std::sync::Arc;

/// Builder for configuring a FIX initiator engine.
pub struct EngineBuilder<A: Application = NoOpApplication> {
    /// Application callback handler.
    application: Arc<A>,
    /// Session settings.
    settings: Option<SessionSettings>,
    /// Persisted sequence numbers.
    sequences: Option<Arc<dyn SequenceProvider>>,
    /// Logon credentials.
    credentials: Option<Arc<dyn CredentialProvider>>,
    /// Connection to session association.
    sessions: Option<Arc<dyn SessionStore>>,
    /// Downstream session event consumer.
    events: Option<Arc<dyn EventSink>>,
}

impl Default for EngineBuilder<NoOpApplication> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder<NoOpApplication> {
    /// Creates a new engine builder with default collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            application: Arc::new(NoOpApplication),
            settings: None,
            sequences: None,
            credentials: None,
            sessions: None,
            events: None,
        }
    }
}

impl<A: Application> EngineBuilder<A> {
    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B: Application>(self, application: B) -> EngineBuilder<B> {
        EngineBuilder {
            application: Arc::new(application),
            settings: self.settings,
            sequences: self.sequences,
            credentials: self.credentials,
            sessions: self.sessions,
            events: self.events,
        }
    }

    /// Sets the session settings.
    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the sequence provider. Defaults to a fresh in-memory store.
    #[must_use]
    pub fn with_sequence_provider(mut self, sequences: Arc<dyn SequenceProvider>) -> Self {
        self.sequences = Some(sequences);
        self
    }

    /// Sets the credential provider.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the session store. Defaults to [`MemorySessionStore`].
    #[must_use]
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Sets the event sink. Defaults to [`NoOpEventSink`].
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Returns the configured settings.
    #[must_use]
    pub const fn settings(&self) -> Option<&SessionSettings> {
        self.settings.as_ref()
    }

    /// Returns the application handler.
    #[must_use]
    pub fn application(&self) -> Arc<A> {
        Arc::clone(&self.application)
    }

    /// Validates the configuration and builds the engine.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if no settings were given or the
    /// settings fail validation.
    pub fn build(self) -> Result<Engine<A>, SessionError> {
        let settings = self.settings.ok_or_else(|| {
            SessionError::Configuration("session settings are required".to_string())
        })?;
        settings.validate()?;

        let sequences = self
            .sequences
            .unwrap_or_else(|| Arc::new(MemorySequenceStore::new()));
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let events = self.events.unwrap_or_else(|| Arc::new(NoOpEventSink));

        let mut initiator = Initiator::new(
            Arc::new(settings),
            sequences,
            Arc::clone(&sessions),
            events,
        );
        if let Some(credentials) = self.credentials {
            initiator = initiator.with_credentials(credentials);
        }

        Ok(Engine::new(Arc::new(initiator), sessions, self.application))
    }
}

impl<A: Application> fmt::Debug for EngineBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("settings", &self.settings)
            .field("sequences", &self.sequences.is_some())
            .field("credentials", &self.credentials.is_some())
            .field("sessions", &self.sessions.is_some())
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlink_core::types::CompId;

    fn settings() -> SessionSettings {
        SessionSettings::new(
            CompId::new("SENDER").unwrap(),
            CompId::new("TARGET").unwrap(),
            "FIX.4.4",
        )
    }

    #[test]
    fn test_engine_builder_requires_settings() {
        let err = EngineBuilder::new().build().unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }

    #[test]
    fn test_engine_builder_validates_settings() {
        let mut invalid = settings();
        invalid.begin_string = String::new();
        let err = EngineBuilder::new()
            .with_settings(invalid)
            .build()
            .unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }

    #[test]
    fn test_engine_builder_with_settings() {
        let builder = EngineBuilder::new().with_settings(settings());
        assert_eq!(
            builder.settings().map(|s| s.begin_string.as_str()),
            Some("FIX.4.4")
        );

        let engine = builder.build().unwrap();
        assert!(engine.sessions().get(fixlink_session::ConnectionId::new(1)).is_none());
    }
}
