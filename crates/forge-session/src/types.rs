//! Core types for generation sessions
//!
//! Defines:
//! - Session, target and account identifiers
//! - Session configuration
//! - Session status
//! - Generation requests and outcomes

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use forge_artifact::CanonicalArtifact;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;
use ulid::Ulid;

/// Unique session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from any string
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow as str
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Generation target (the design being turned into code)
    TargetId
);

string_id!(
    /// Credit ledger account
    AccountId
);

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Successful generations allowed per target after the first
    pub max_regenerations: u32,
    /// Credits debited per successful generation
    pub generation_cost: u64,
    /// Seconds to wait for the next streamed chunk
    pub chunk_idle_timeout_secs: u64,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML; missing keys take defaults
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed TOML or out-of-range values
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if the idle timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "chunk_idle_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// With max regenerations
    #[inline]
    #[must_use]
    pub fn with_max_regenerations(mut self, max: u32) -> Self {
        self.max_regenerations = max;
        self
    }

    /// With generation cost
    #[inline]
    #[must_use]
    pub fn with_generation_cost(mut self, cost: u64) -> Self {
        self.generation_cost = cost;
        self
    }

    /// With chunk idle timeout
    #[inline]
    #[must_use]
    pub fn with_chunk_idle_timeout_secs(mut self, secs: u64) -> Self {
        self.chunk_idle_timeout_secs = secs;
        self
    }

    /// Chunk idle timeout as a duration
    #[inline]
    #[must_use]
    pub fn chunk_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_idle_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_regenerations: 5,
            generation_cost: 1,
            chunk_idle_timeout_secs: 120,
        }
    }
}

/// Session lifecycle
///
/// `Idle → Gated → Requesting → Decoding → Persisted`, with `Errored`
/// reachable from `Gated`, `Requesting` and `Decoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No attempt yet
    Idle,
    /// Pre-flight checks running
    Gated,
    /// Waiting for the backend
    Requesting,
    /// Output arriving
    Decoding,
    /// Last attempt persisted an artifact
    Persisted,
    /// Last attempt failed
    Errored,
}

impl SessionStatus {
    /// Whether an attempt is running
    #[inline]
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Gated | Self::Requesting | Self::Decoding)
    }
}

/// Image the design was captured from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignPrompt {
    /// Natural-language description of the design
    pub description: String,
    /// Optional screenshot or mockup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAttachment>,
}

impl DesignPrompt {
    /// Create prompt from a description
    #[inline]
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image: None,
        }
    }

    /// With image
    #[inline]
    #[must_use]
    pub fn with_image(mut self, media_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.image = Some(ImageAttachment {
            media_type: media_type.into(),
            data: data.into(),
        });
        self
    }
}

/// Request handed to the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Session issuing the request
    pub session_id: SessionId,
    /// Target being generated
    pub target_id: TargetId,
    /// User prompt
    pub prompt: DesignPrompt,
    /// Last persisted artifact, when regenerating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<CanonicalArtifact>,
}

impl GenerationRequest {
    /// Whether this request regenerates an existing artifact
    #[inline]
    #[must_use]
    pub fn is_regeneration(&self) -> bool {
        self.previous.is_some()
    }
}

/// Result of a persisted generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// The persisted artifact
    pub artifact: CanonicalArtifact,
    /// Counter after this generation
    pub regeneration_count: u32,
    /// Ledger balance after the debit
    pub credits_remaining: u64,
    /// Output matched the current artifact; the store was not written
    pub unchanged: bool,
    /// When the artifact was persisted
    pub persisted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SessionConfig::new();
        assert_eq!(config.max_regenerations, 5);
        assert_eq!(config.generation_cost, 1);
        assert_eq!(config.chunk_idle_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn config_from_toml_fills_defaults() {
        let config = SessionConfig::from_toml_str("max_regenerations = 2\n").unwrap();
        assert_eq!(config.max_regenerations, 2);
        assert_eq!(config.generation_cost, 1);
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let result = SessionConfig::from_toml_str("chunk_idle_timeout_secs = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_rejects_bad_toml() {
        let result = SessionConfig::from_toml_str("max_regenerations = \"many\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn config_builder() {
        let config = SessionConfig::new()
            .with_max_regenerations(1)
            .with_generation_cost(10)
            .with_chunk_idle_timeout_secs(5);
        assert_eq!(config.max_regenerations, 1);
        assert_eq!(config.generation_cost, 10);
        assert_eq!(config.chunk_idle_timeout_secs, 5);
    }

    #[test]
    fn in_flight_statuses() {
        assert!(SessionStatus::Gated.is_in_flight());
        assert!(SessionStatus::Requesting.is_in_flight());
        assert!(SessionStatus::Decoding.is_in_flight());
        assert!(!SessionStatus::Idle.is_in_flight());
        assert!(!SessionStatus::Persisted.is_in_flight());
        assert!(!SessionStatus::Errored.is_in_flight());
    }

    #[test]
    fn string_ids() {
        let target = TargetId::from("landing-page");
        assert_eq!(target.as_str(), "landing-page");
        assert_eq!(target.to_string(), "landing-page");
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn prompt_with_image() {
        let prompt = DesignPrompt::new("a pricing table").with_image("image/png", "iVBORw0KGgo=");
        assert_eq!(prompt.image.as_ref().unwrap().media_type, "image/png");
    }
}
