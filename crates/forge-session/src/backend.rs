//! Collaborator seams
//!
//! The session talks to three external systems, each behind a trait:
//! the generation backend, the record store and the credit ledger.

use crate::error::{LedgerError, StoreError, TransportError};
use crate::types::{AccountId, GenerationRequest, TargetId};
use forge_artifact::CanonicalArtifact;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;

/// Incremental backend output
pub type ChunkSource = BoxStream<'static, Result<String, TransportError>>;

/// What the backend sent back
pub enum BackendResponse {
    /// Whole payload in one piece
    Complete(String),
    /// Payload arriving as chunks
    Streaming(ChunkSource),
}

impl fmt::Debug for BackendResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete(payload) => f.debug_tuple("Complete").field(&payload.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

/// Code generation backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Start a generation
    ///
    /// Returning `Ok` means the backend accepted the request; output may
    /// still fail while streaming.
    async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<BackendResponse, TransportError>;
}

/// Persistent artifact records, one per target
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Replace the record for `target`
    async fn save_artifact(
        &self,
        target: &TargetId,
        artifact: &CanonicalArtifact,
    ) -> Result<(), StoreError>;

    /// Load the record for `target`, if any
    async fn load_artifact(&self, target: &TargetId)
        -> Result<Option<CanonicalArtifact>, StoreError>;
}

/// Result of an atomic decrement-if-sufficient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Amount taken
    Debited {
        /// Balance after the debit
        remaining: u64,
    },
    /// Balance too low; nothing taken
    Insufficient {
        /// Balance at the time of the attempt
        balance: u64,
    },
}

/// Shared credit ledger
///
/// `try_debit` must be atomic: the session never reads a balance and
/// writes it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current balance
    async fn balance(&self, account: &AccountId) -> Result<u64, LedgerError>;

    /// Take `amount` if the balance covers it
    async fn try_debit(&self, account: &AccountId, amount: u64)
        -> Result<DebitOutcome, LedgerError>;
}

/// Handles to the external systems a session needs
#[derive(Clone)]
pub struct Collaborators {
    /// Generation backend
    pub backend: Arc<dyn GenerationBackend>,
    /// Artifact record store
    pub store: Arc<dyn RecordStore>,
    /// Credit ledger
    pub ledger: Arc<dyn CreditLedger>,
}

impl Collaborators {
    /// Bundle collaborators
    #[inline]
    #[must_use]
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn RecordStore>,
        ledger: Arc<dyn CreditLedger>,
    ) -> Self {
        Self {
            backend,
            store,
            ledger,
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
