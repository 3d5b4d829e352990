//! Project file paths
//!
//! Provides [`ProjectPath`], the normalized key of a file inside a
//! multi-file project.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path separator used by every normalized path
pub const SEPARATOR: char = '/';

/// Normalized path of a file within a project
///
/// Always begins with exactly one leading `/` and uses `/` as separator.
///
/// # Examples
/// - `App.js` → `/App.js`
/// - `//src\\index.ts` → `/src/index.ts`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectPath(String);

impl ProjectPath {
    /// Normalize a raw path
    ///
    /// # Errors
    /// Returns [`PathError::Empty`] if nothing remains after trimming
    /// whitespace and separators.
    pub fn new(raw: &str) -> Result<Self, PathError> {
        let unified = raw.trim().replace('\\', "/");
        let body = unified.trim_start_matches(SEPARATOR);
        if body.is_empty() {
            return Err(PathError::Empty);
        }
        let mut normalized = String::with_capacity(body.len() + 1);
        normalized.push(SEPARATOR);
        normalized.push_str(body);
        Ok(Self(normalized))
    }

    /// Get the normalized path string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// File name without its extension
    #[must_use]
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Extension of the final component, without the dot
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl Display for ProjectPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for ProjectPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ProjectPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors from path normalization
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Path had no components
    #[error("empty project path")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_leading_separator() {
        assert_eq!(ProjectPath::new("App.js").unwrap().as_str(), "/App.js");
        assert_eq!(ProjectPath::new("/App.js").unwrap().as_str(), "/App.js");
    }

    #[test]
    fn collapses_repeated_leading_separators() {
        assert_eq!(ProjectPath::new("///src/App.js").unwrap().as_str(), "/src/App.js");
    }

    #[test]
    fn unifies_backslashes_and_trims() {
        let path = ProjectPath::new("  src\\components\\Button.tsx \n").unwrap();
        assert_eq!(path.as_str(), "/src/components/Button.tsx");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(ProjectPath::new(""), Err(PathError::Empty));
        assert_eq!(ProjectPath::new(" / "), Err(PathError::Empty));
    }

    #[test]
    fn file_name_stem_and_extension() {
        let path = ProjectPath::new("src/App.test.jsx").unwrap();
        assert_eq!(path.file_name(), "App.test.jsx");
        assert_eq!(path.file_stem(), "App.test");
        assert_eq!(path.extension(), Some("jsx"));

        let dotfile = ProjectPath::new(".env").unwrap();
        assert_eq!(dotfile.extension(), None);
        assert_eq!(dotfile.file_stem(), ".env");
    }

    #[test]
    fn equal_after_normalization() {
        let a: ProjectPath = "App.js".parse().unwrap();
        let b: ProjectPath = "/App.js".parse().unwrap();
        assert_eq!(a, b);
    }
}
