//! Payload format sniffing
//!
//! Classification is total: every input maps to exactly one
//! [`EncodingKind`], with [`EncodingKind::Unknown`] for structured-looking
//! text that matches no known shape.

use crate::compile_regex;
use crate::fence::FENCE_MARKER;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

static CHOICES_ARRAY: Lazy<Regex> = Lazy::new(|| compile_regex(r#""choices"\s*:\s*\["#));
static MESSAGE_KEY: Lazy<Regex> = Lazy::new(|| compile_regex(r#""message"\s*:"#));
static FILES_OBJECT: Lazy<Regex> = Lazy::new(|| compile_regex(r#""files"\s*:\s*\{"#));

/// Encoding of a generation payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EncodingKind {
    /// Bare source text
    PlainSource,
    /// Source wrapped in triple-backtick fences
    FencedBlock,
    /// Chat-completion response carrying the payload in a content field
    ChatEnvelope,
    /// JSON description of a multi-file project
    ProjectManifest,
    /// Structured-looking text of no known shape
    Unknown,
}

impl EncodingKind {
    /// Whether the payload is a JSON document
    ///
    /// A complete JSON document cannot be extended into a different valid
    /// one, so a successful extraction of a structured prefix is final.
    #[inline]
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::ChatEnvelope | Self::ProjectManifest | Self::Unknown)
    }
}

impl Display for EncodingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlainSource => "plain_source",
            Self::FencedBlock => "fenced_block",
            Self::ChatEnvelope => "chat_envelope",
            Self::ProjectManifest => "project_manifest",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a complete payload
///
/// Rules in priority order: chat envelope, project manifest, other
/// `{`-prefixed text, fenced block, plain source.
#[must_use]
pub fn classify(text: &str) -> EncodingKind {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        if CHOICES_ARRAY.is_match(trimmed) && MESSAGE_KEY.is_match(trimmed) {
            EncodingKind::ChatEnvelope
        } else if FILES_OBJECT.is_match(trimmed) {
            EncodingKind::ProjectManifest
        } else {
            EncodingKind::Unknown
        }
    } else if trimmed.contains(FENCE_MARKER) {
        EncodingKind::FencedBlock
    } else {
        EncodingKind::PlainSource
    }
}
