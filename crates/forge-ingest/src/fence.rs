//! Markdown fence stripping
//!
//! The generator is inconsistent about info strings, so every fence token is
//! removed together with whatever tag is glued to it.

use crate::compile_regex;
use once_cell::sync::Lazy;
use regex::Regex;

/// Triple-backtick fence marker
pub const FENCE_MARKER: &str = "```";

// A run of 3+ backticks. An info string such as `jsx`, `c++` or
// `objective-c` goes with it only when the line ends right after, so code
// glued to a fence survives.
static FENCE_TOKEN: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"`{3,}(?:[A-Za-z0-9_+#.\-]*[ \t]*(?:\r?\n|$))?"));

/// Remove every fence token from `text`
#[must_use]
pub fn strip_fences(text: &str) -> String {
    FENCE_TOKEN.replace_all(text, "").into_owned()
}

/// Best-effort text to show while a payload is still arriving
#[must_use]
pub fn display_text(buffer: &str) -> String {
    strip_fences(buffer).trim().to_string()
}
