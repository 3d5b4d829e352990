//! Artifact fingerprints
//!
//! Blake3 over a length-prefixed walk of the artifact. Two artifacts share a
//! fingerprint exactly when they carry the same files, in the same order,
//! with the same title and explanation, however the backend encoded them.

use crate::artifact::CanonicalArtifact;
use std::fmt::{self, Display, Formatter};

/// Blake3 fingerprint of a [`CanonicalArtifact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint `artifact`
    #[must_use]
    pub fn of(artifact: &CanonicalArtifact) -> Self {
        let mut walk = Walk(blake3::Hasher::new());
        match artifact {
            CanonicalArtifact::SingleFile { content } => {
                walk.field("single_file");
                walk.field(content);
            }
            CanonicalArtifact::MultiFileProject(project) => {
                walk.field("multi_file_project");
                walk.optional(project.title());
                walk.optional(project.explanation());
                walk.count(project.files().len());
                for (path, content) in project.files().iter() {
                    walk.field(path.as_str());
                    walk.field(content);
                }
            }
        }
        Self(*walk.0.finalize().as_bytes())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 bytes as hex, for logs
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// Every variable-length field is prefixed with its length so adjacent
// fields cannot run into each other.
struct Walk(blake3::Hasher);

impl Walk {
    fn count(&mut self, n: usize) {
        self.0.update(&(n as u64).to_le_bytes());
    }

    fn field(&mut self, value: &str) {
        self.count(value.len());
        self.0.update(value.as_bytes());
    }

    fn optional(&mut self, value: Option<&str>) {
        match value {
            Some(value) => {
                self.0.update(&[1]);
                self.field(value);
            }
            None => {
                self.0.update(&[0]);
            }
        }
    }
}
