//! Error types for payload extraction
//!
//! Every failure carries a bounded snippet of the offending text, never the
//! whole payload.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Maximum number of characters kept from an offending payload
pub const SNIPPET_LIMIT: usize = 200;

/// Classification of an extraction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExtractionErrorKind {
    /// Structured-looking text that is not valid JSON (or not a known shape)
    NotJson,
    /// Chat envelope without a `choices[0].message.content` string
    MissingContentField,
    /// Project manifest that yields no files
    EmptyProject,
    /// Fenced block with nothing inside the fences
    MalformedFence,
    /// Nothing but whitespace
    EmptyPayload,
}

impl Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotJson => "not json",
            Self::MissingContentField => "missing content field",
            Self::EmptyProject => "empty project",
            Self::MalformedFence => "malformed fence",
            Self::EmptyPayload => "empty payload",
        };
        f.write_str(name)
    }
}

/// A payload that could not be turned into an artifact
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {snippet:?}")]
pub struct ExtractionError {
    kind: ExtractionErrorKind,
    snippet: String,
}

impl ExtractionError {
    /// Create error, keeping at most [`SNIPPET_LIMIT`] chars of `raw`
    #[must_use]
    pub fn new(kind: ExtractionErrorKind, raw: &str) -> Self {
        Self {
            kind,
            snippet: bounded_snippet(raw),
        }
    }

    /// Failure classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ExtractionErrorKind {
        self.kind
    }

    /// Leading slice of the offending text
    #[inline]
    #[must_use]
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Same kind, snippet taken from `raw` instead
    #[must_use]
    pub(crate) fn rebased(self, raw: &str) -> Self {
        Self::new(self.kind, raw)
    }
}

fn bounded_snippet(raw: &str) -> String {
    match raw.char_indices().nth(SNIPPET_LIMIT) {
        Some((end, _)) => raw[..end].to_string(),
        None => raw.to_string(),
    }
}
