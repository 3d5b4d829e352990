//! Error types for generation sessions
//!
//! Three families, handled differently by callers:
//! - [`GateError`]: user-actionable, never retried automatically
//! - [`TransportError`]: backend/network failure, surfaced with a retry
//!   affordance but never retried automatically (retries may double-bill)
//! - extraction failures: the backend produced something unusable; asking
//!   it to regenerate is the remedy

use forge_ingest::ExtractionError;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Pre-flight gate rejected the attempt
    #[error("gate rejected generation: {0}")]
    Gate(#[from] GateError),

    /// Backend or network failure
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Backend output could not be turned into an artifact
    #[error("extraction failed: {error}")]
    Extraction {
        /// The folded extraction failure
        error: ExtractionError,
        /// What arrived, fence-stripped, for display
        best_effort_text: String,
    },

    /// Record store failure
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// Credit ledger failure
    #[error("credit ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Invalid session configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Whether offering the user a retry makes sense
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Extraction { .. })
    }

    /// Whether the user must act (buy credits, wait) before trying again
    #[inline]
    #[must_use]
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::Gate(_))
    }

    /// Partial output to show instead of a blank error screen
    #[must_use]
    pub fn best_effort_text(&self) -> Option<&str> {
        match self {
            Self::Extraction {
                best_effort_text, ..
            } => Some(best_effort_text),
            _ => None,
        }
    }
}

/// Pre-flight gate rejections
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Balance below the cost of one generation
    #[error("insufficient credits: balance {balance}, cost {cost}")]
    InsufficientCredits {
        /// Balance when checked
        balance: u64,
        /// Cost of one generation
        cost: u64,
    },

    /// Regeneration budget for this target used up
    #[error("regeneration limit reached ({count}/{max})")]
    RegenerationLimitReached {
        /// Successful generations so far
        count: u32,
        /// Configured limit
        max: u32,
    },

    /// Another generation is running on this session
    #[error("a generation is already in progress")]
    AlreadyInProgress,
}

/// Backend and network failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection-level failure
    #[error("network failure: {0}")]
    Network(String),

    /// Backend answered with an error
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP-style status code
        status: u16,
        /// Backend error message
        message: String,
    },

    /// No chunk arrived within the idle timeout
    #[error("no data received for {secs}s")]
    IdleTimeout {
        /// Configured idle timeout
        secs: u64,
    },
}

/// Record store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Record could not be encoded or decoded
    #[error("record serialization failed: {0}")]
    Serialization(String),
}

/// Credit ledger failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No such account
    #[error("unknown account: {0}")]
    UnknownAccount(String),

    /// Ledger could not be reached
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}
