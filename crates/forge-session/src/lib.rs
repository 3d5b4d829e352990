//! Forge Session
//!
//! Gate and orchestration around code generation attempts: credit and
//! regeneration checks, single-flight enforcement, backend invocation,
//! decoding and persistence.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                  GenerationSession                    │
//! │   gate ─► backend ─► Normalizer | StreamDecoder ─►    │
//! │                                 store ─► ledger       │
//! └──────┬──────────────────┬──────────────────┬──────────┘
//!        ▼                  ▼                  ▼
//!  GenerationBackend    RecordStore       CreditLedger
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_session::prelude::*;
//!
//! let session = GenerationSession::open(target, account, SessionConfig::default(), collaborators).await?;
//! let mut preview = session.subscribe_preview();
//! let outcome = session.generate(DesignPrompt::new("a pricing page")).await?;
//! println!("{} regenerations left", session.remaining_regenerations());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod session;
pub mod types;

pub use backend::{
    BackendResponse, ChunkSource, Collaborators, CreditLedger, DebitOutcome, GenerationBackend,
    RecordStore,
};
pub use error::{ConfigError, GateError, LedgerError, SessionError, StoreError, TransportError};
pub use memory::{InMemoryLedger, InMemoryRecordStore};
pub use session::GenerationSession;
pub use types::{
    AccountId, DesignPrompt, GenerationOutcome, GenerationRequest, ImageAttachment, SessionConfig,
    SessionId, SessionStatus, TargetId,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running generation sessions
    pub use crate::backend::{BackendResponse, Collaborators, GenerationBackend};
    pub use crate::error::{GateError, SessionError};
    pub use crate::session::GenerationSession;
    pub use crate::types::{AccountId, DesignPrompt, SessionConfig, SessionStatus, TargetId};
    pub use forge_artifact::CanonicalArtifact;
}
