//! Forge Ingest
//!
//! Recovers a canonical code artifact from generation-backend output that
//! may arrive whole or in fragments, in any of several encodings.
//!
//! # Pipeline
//!
//! ```text
//! payload ──► classify ──► EncodingKind ──► extract ──► CanonicalArtifact
//!                 ▲                            │
//!                 └──── unwrapped content ◄────┘  (envelopes, fences; depth ≤ 2)
//!
//! chunks ──► StreamDecoder ──► Partial* (Ready | Failed)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_ingest::{normalize, StreamDecoder, DecodeEvent};
//!
//! let artifact = normalize("```jsx\nexport default function App() {}\n```")?;
//!
//! let mut decoder = StreamDecoder::new(chunks);
//! while let Some(event) = decoder.next_event().await {
//!     match event? {
//!         DecodeEvent::Partial { visible_text } => render_preview(&visible_text),
//!         DecodeEvent::Ready { artifact } => return Ok(artifact),
//!         DecodeEvent::Failed { error, best_effort_text } => show_failure(error, best_effort_text),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod extract;
pub mod fence;
pub mod normalize;
pub mod sniff;
pub mod stream;

// Re-exports for convenience
pub use error::{ExtractionError, ExtractionErrorKind, SNIPPET_LIMIT};
pub use extract::{extract, MAX_REENTRY_DEPTH};
pub use fence::{display_text, strip_fences, FENCE_MARKER};
pub use normalize::{normalize, Normalizer};
pub use sniff::{classify, EncodingKind};
pub use stream::{DecodeEvent, DecodeState, DecoderCore, StreamDecoder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for decoding generation payloads
    pub use crate::error::{ExtractionError, ExtractionErrorKind};
    pub use crate::normalize::{normalize, Normalizer};
    pub use crate::sniff::{classify, EncodingKind};
    pub use crate::stream::{DecodeEvent, StreamDecoder};
    pub use forge_artifact::CanonicalArtifact;
}

pub(crate) fn compile_regex(pattern: &str) -> regex::Regex {
    match regex::Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}
