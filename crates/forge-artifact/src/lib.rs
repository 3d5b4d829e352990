//! Forge Artifact Model
//!
//! The canonical, renderable result of one code generation.
//!
//! # Core Concepts
//!
//! - [`CanonicalArtifact`]: a single file or a multi-file [`Project`]
//! - [`ProjectPath`]: normalized project file path (single leading `/`)
//! - [`FileMap`]: insertion-ordered files where a repeated path overwrites
//! - [`Fingerprint`]: Blake3 fingerprint of an artifact's files
//! - [`export_artifact`]: text / markdown / structured downloads
//!
//! # Example
//!
//! ```rust,ignore
//! use forge_artifact::{export_artifact, CanonicalArtifact, ExportFormat};
//!
//! let artifact = CanonicalArtifact::single_file("export default function App() {}");
//! let doc = export_artifact(&artifact, ExportFormat::Markdown)?;
//! assert_eq!(doc.mime_type, "text/markdown");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod artifact;
mod export;
mod hash;
mod path;

// Re-exports
pub use artifact::{ArtifactError, CanonicalArtifact, FileMap, Project, ENTRY_FILE_NAMES};
pub use export::{export_artifact, ExportError, ExportFormat, ExportedArtifact, SINGLE_FILE_NAME};
pub use hash::Fingerprint;
pub use path::{PathError, ProjectPath, SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn project_export_round_trip() {
        let mut files = FileMap::new();
        files.insert(ProjectPath::new("App.js").unwrap(), "a");
        files.insert(ProjectPath::new("/App.js").unwrap(), "b");
        let artifact = CanonicalArtifact::MultiFileProject(Project::new(files).unwrap());

        assert_eq!(artifact.file_count(), 1);
        assert_eq!(artifact.primary_content(), "b");

        let structured = export_artifact(&artifact, ExportFormat::Structured).unwrap();
        let decoded: CanonicalArtifact = serde_json::from_str(&structured.content).unwrap();
        assert_eq!(decoded.fingerprint(), artifact.fingerprint());
    }
}
