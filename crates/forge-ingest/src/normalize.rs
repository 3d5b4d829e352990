//! Synchronous entry point for complete payloads

use crate::error::ExtractionError;
use crate::extract::extract;
use crate::sniff::classify;
use forge_artifact::CanonicalArtifact;

/// Composes sniffing and extraction for a complete payload
///
/// Stateless; cheap to copy into decoders and sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create new normalizer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Recover the canonical artifact from a complete payload
    ///
    /// # Errors
    /// Returns [`ExtractionError`] if no artifact can be recovered.
    pub fn normalize(&self, text: &str) -> Result<CanonicalArtifact, ExtractionError> {
        let kind = classify(text);
        tracing::trace!(%kind, len = text.len(), "classified payload");
        extract(text, kind).map_err(|error| {
            tracing::debug!(%kind, error_kind = %error.kind(), "extraction failed");
            error
        })
    }
}

/// Normalize a complete payload with the default [`Normalizer`]
///
/// # Errors
/// Returns [`ExtractionError`] if no artifact can be recovered.
#[inline]
pub fn normalize(text: &str) -> Result<CanonicalArtifact, ExtractionError> {
    Normalizer.normalize(text)
}
