//! Canonical artifacts
//!
//! A [`CanonicalArtifact`] is the renderable result of one generation: either
//! the content of a single file or a [`Project`] of many files.

use crate::hash::Fingerprint;
use crate::path::ProjectPath;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// File names treated as the entry point of a project, in priority order
pub const ENTRY_FILE_NAMES: &[&str] = &[
    "App.js",
    "App.jsx",
    "App.tsx",
    "App.ts",
    "index.js",
    "index.jsx",
    "index.tsx",
    "index.ts",
    "index.html",
];

/// Insertion-ordered map of project files
///
/// Re-inserting an existing path replaces its content but keeps the
/// position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMap(IndexMap<ProjectPath, String>);

impl FileMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert file content, returning the replaced content if the path existed
    pub fn insert(&mut self, path: ProjectPath, content: impl Into<String>) -> Option<String> {
        self.0.insert(path, content.into())
    }

    /// Content of a file
    #[must_use]
    pub fn get(&self, path: &ProjectPath) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate files in manifest order
    pub fn iter(&self) -> impl Iterator<Item = (&ProjectPath, &str)> {
        self.0.iter().map(|(p, c)| (p, c.as_str()))
    }

    /// Iterate paths in manifest order
    pub fn paths(&self) -> impl Iterator<Item = &ProjectPath> {
        self.0.keys()
    }
}

impl FromIterator<(ProjectPath, String)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (ProjectPath, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, content) in iter {
            map.insert(path, content);
        }
        map
    }
}

/// Multi-file project
///
/// The file map is never empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProjectRepr")]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    files: FileMap,
}

#[derive(Deserialize)]
struct ProjectRepr {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    files: FileMap,
}

impl TryFrom<ProjectRepr> for Project {
    type Error = ArtifactError;

    fn try_from(repr: ProjectRepr) -> Result<Self, Self::Error> {
        Ok(Self::new(repr.files)?
            .with_title(repr.title)
            .with_explanation(repr.explanation))
    }
}

impl Project {
    /// Create project from its files
    ///
    /// # Errors
    /// Returns [`ArtifactError::EmptyProject`] if `files` is empty
    pub fn new(files: FileMap) -> Result<Self, ArtifactError> {
        if files.is_empty() {
            return Err(ArtifactError::EmptyProject);
        }
        Ok(Self {
            title: None,
            explanation: None,
            files,
        })
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// With explanation
    #[inline]
    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation;
        self
    }

    /// Project title, if the generator supplied one
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Free-form explanation, if the generator supplied one
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Project files
    #[must_use]
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    /// Entry file: the first known entry name, else the first file
    #[must_use]
    pub fn primary_path(&self) -> &ProjectPath {
        let by_entry_name = ENTRY_FILE_NAMES
            .iter()
            .find_map(|name| self.files.paths().find(|p| p.file_name() == *name));
        match by_entry_name {
            Some(path) => path,
            // Non-empty by construction
            None => self
                .files
                .paths()
                .next()
                .unwrap_or_else(|| unreachable!("project without files")),
        }
    }
}

/// The canonical result of one generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalArtifact {
    /// Content of a single source file
    SingleFile {
        /// Source text
        content: String,
    },
    /// Project of one or more files
    MultiFileProject(Project),
}

impl CanonicalArtifact {
    /// Create single-file artifact
    #[inline]
    #[must_use]
    pub fn single_file(content: impl Into<String>) -> Self {
        Self::SingleFile {
            content: content.into(),
        }
    }

    /// Content of the file a flat export would show
    #[must_use]
    pub fn primary_content(&self) -> &str {
        match self {
            Self::SingleFile { content } => content,
            Self::MultiFileProject(project) => project
                .files()
                .get(project.primary_path())
                .unwrap_or_default(),
        }
    }

    /// Path of the primary file (projects only)
    #[must_use]
    pub fn primary_path(&self) -> Option<&ProjectPath> {
        match self {
            Self::SingleFile { .. } => None,
            Self::MultiFileProject(project) => Some(project.primary_path()),
        }
    }

    /// Number of files carried
    #[must_use]
    pub fn file_count(&self) -> usize {
        match self {
            Self::SingleFile { .. } => 1,
            Self::MultiFileProject(project) => project.files().len(),
        }
    }

    /// Project view, if this is a multi-file artifact
    #[must_use]
    pub fn as_project(&self) -> Option<&Project> {
        match self {
            Self::SingleFile { .. } => None,
            Self::MultiFileProject(project) => Some(project),
        }
    }

    /// Content fingerprint; equal for artifacts with identical files
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

/// Errors related to artifact construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    /// Project constructed without files
    #[error("project has no files")]
    EmptyProject,
}
