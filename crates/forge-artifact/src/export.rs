//! Export surface
//!
//! Pure conversion of a [`CanonicalArtifact`] into a downloadable document.
//! `structured` is lossless for both variants; `text` and `markdown` flatten
//! to the primary file.

use crate::artifact::CanonicalArtifact;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// File name used for single-file text exports
pub const SINGLE_FILE_NAME: &str = "App.jsx";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Raw primary file content
    Text,
    /// Primary file content inside a fenced block
    Markdown,
    /// JSON of the whole artifact
    Structured,
}

impl ExportFormat {
    /// Wire name of the format
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Structured => "structured",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "markdown" => Ok(Self::Markdown),
            "structured" => Ok(Self::Structured),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Exported document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifact {
    /// Document body
    pub content: String,
    /// MIME type of the body
    pub mime_type: &'static str,
    /// Suggested file name
    pub filename: String,
}

/// Export an artifact in the requested format
///
/// # Errors
/// Returns [`ExportError::Serialization`] if the structured form cannot be
/// encoded.
pub fn export_artifact(
    artifact: &CanonicalArtifact,
    format: ExportFormat,
) -> Result<ExportedArtifact, ExportError> {
    let exported = match format {
        ExportFormat::Text => ExportedArtifact {
            content: artifact.primary_content().to_string(),
            mime_type: "text/plain",
            filename: artifact
                .primary_path()
                .map_or(SINGLE_FILE_NAME, |p| p.file_name())
                .to_string(),
        },
        ExportFormat::Markdown => {
            let (stem, extension) = match artifact.primary_path() {
                Some(path) => (path.file_stem(), path.extension()),
                None => ("App", Some("jsx")),
            };
            let tag = extension.map_or("", fence_language);
            let body = artifact.primary_content().trim_end();
            ExportedArtifact {
                content: format!("```{tag}\n{body}\n```\n"),
                mime_type: "text/markdown",
                filename: format!("{stem}.md"),
            }
        }
        ExportFormat::Structured => ExportedArtifact {
            content: serde_json::to_string_pretty(artifact)?,
            mime_type: "application/json",
            filename: "artifact.json".to_string(),
        },
    };
    Ok(exported)
}

/// Fence info string for a file extension
fn fence_language(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "js" | "jsx" => "jsx",
        "ts" | "tsx" => "tsx",
        "css" => "css",
        "html" | "htm" => "html",
        "json" => "json",
        _ => "",
    }
}

/// Errors during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Format name not recognized
    #[error("unknown export format: '{0}'")]
    UnknownFormat(String),

    /// Structured encoding failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{FileMap, Project};
    use crate::path::ProjectPath;
    use pretty_assertions::assert_eq;

    fn project() -> CanonicalArtifact {
        let mut files = FileMap::new();
        files.insert(ProjectPath::new("/styles.css").unwrap(), "body {}");
        files.insert(ProjectPath::new("/App.tsx").unwrap(), "export default App;\n");
        CanonicalArtifact::MultiFileProject(
            Project::new(files)
                .unwrap()
                .with_title(Some("Landing".into()))
                .with_explanation(Some("A landing page".into())),
        )
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(" Markdown ".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("STRUCTURED".parse::<ExportFormat>().unwrap(), ExportFormat::Structured);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(name)) if name == "pdf"
        ));
    }

    #[test]
    fn text_export_of_single_file() {
        let artifact = CanonicalArtifact::single_file("const a = 1;");
        let exported = export_artifact(&artifact, ExportFormat::Text).unwrap();
        assert_eq!(exported.content, "const a = 1;");
        assert_eq!(exported.mime_type, "text/plain");
        assert_eq!(exported.filename, "App.jsx");
    }

    #[test]
    fn text_export_flattens_project_to_primary_file() {
        let exported = export_artifact(&project(), ExportFormat::Text).unwrap();
        assert_eq!(exported.content, "export default App;\n");
        assert_eq!(exported.filename, "App.tsx");
    }

    #[test]
    fn markdown_export_fences_primary_file() {
        let exported = export_artifact(&project(), ExportFormat::Markdown).unwrap();
        assert_eq!(exported.content, "```tsx\nexport default App;\n```\n");
        assert_eq!(exported.mime_type, "text/markdown");
        assert_eq!(exported.filename, "App.md");
    }

    #[test]
    fn structured_export_is_lossless() {
        let artifact = project();
        let exported = export_artifact(&artifact, ExportFormat::Structured).unwrap();
        assert_eq!(exported.mime_type, "application/json");
        let back: CanonicalArtifact = serde_json::from_str(&exported.content).unwrap();
        assert_eq!(back, artifact);
    }
}
