//! Artifact extraction
//!
//! Turns a classified payload into a [`CanonicalArtifact`]. Envelopes and
//! fenced blocks are unwrapped and the inner text is classified again, at
//! most [`MAX_REENTRY_DEPTH`] times. Extraction is pure: identical input
//! always yields identical output.

use crate::error::{ExtractionError, ExtractionErrorKind};
use crate::fence::strip_fences;
use crate::sniff::{classify, EncodingKind};
use forge_artifact::{CanonicalArtifact, FileMap, Project, ProjectPath};
use serde_json::{Map, Value};

/// Maximum number of nested unwraps (envelope or fence) followed
pub const MAX_REENTRY_DEPTH: usize = 2;

/// Extract an artifact from `text` already classified as `kind`
///
/// # Errors
/// Returns a single [`ExtractionError`] for the outermost payload; failures
/// of nested payloads are folded into it.
pub fn extract(text: &str, kind: EncodingKind) -> Result<CanonicalArtifact, ExtractionError> {
    extract_at_depth(text, kind, 0)
}

fn extract_at_depth(
    text: &str,
    kind: EncodingKind,
    depth: usize,
) -> Result<CanonicalArtifact, ExtractionError> {
    match kind {
        EncodingKind::PlainSource => extract_plain(text),
        EncodingKind::FencedBlock => extract_fenced(text, depth),
        EncodingKind::ChatEnvelope => extract_envelope(text, depth),
        EncodingKind::ProjectManifest => extract_manifest(text),
        EncodingKind::Unknown => extract_manifest(text)
            .map_err(|_| ExtractionError::new(ExtractionErrorKind::NotJson, text)),
    }
}

/// Classify and extract an unwrapped payload one level deeper
fn reenter(inner: &str, depth: usize) -> Result<CanonicalArtifact, ExtractionError> {
    if depth >= MAX_REENTRY_DEPTH {
        return extract_plain(inner);
    }
    extract_at_depth(inner, classify(inner), depth + 1)
}

fn extract_plain(text: &str) -> Result<CanonicalArtifact, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::new(ExtractionErrorKind::EmptyPayload, text));
    }
    Ok(CanonicalArtifact::single_file(text))
}

fn extract_fenced(text: &str, depth: usize) -> Result<CanonicalArtifact, ExtractionError> {
    let stripped = strip_fences(text);
    let body = stripped.trim();
    if body.is_empty() {
        return Err(ExtractionError::new(ExtractionErrorKind::MalformedFence, text));
    }
    match reenter(body, depth) {
        // A brace-led body that is not a manifest is still source
        Err(e) if e.kind() == ExtractionErrorKind::NotJson => extract_plain(body),
        result => result.map_err(|e| e.rebased(text)),
    }
}

fn extract_envelope(text: &str, depth: usize) -> Result<CanonicalArtifact, ExtractionError> {
    let value = parse_json(text)?;
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractionError::new(ExtractionErrorKind::MissingContentField, text))?;
    reenter(content, depth).map_err(|e| e.rebased(text))
}

fn extract_manifest(text: &str) -> Result<CanonicalArtifact, ExtractionError> {
    let value = parse_json(text)?;
    let not_manifest = || ExtractionError::new(ExtractionErrorKind::NotJson, text);
    let root = value.as_object().ok_or_else(not_manifest)?;

    let files: FileMap = match root.get("files") {
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(path, entry)| file_from_keyed_entry(path, entry))
            .collect(),
        Some(Value::Array(entries)) => entries.iter().filter_map(file_from_listed_entry).collect(),
        _ => return Err(not_manifest()),
    };

    let project = Project::new(files)
        .map_err(|_| ExtractionError::new(ExtractionErrorKind::EmptyProject, text))?
        .with_title(string_field(root, "title"))
        .with_explanation(string_field(root, "explanation"));
    Ok(CanonicalArtifact::MultiFileProject(project))
}

fn parse_json(text: &str) -> Result<Value, ExtractionError> {
    serde_json::from_str(text).map_err(|_| ExtractionError::new(ExtractionErrorKind::NotJson, text))
}

/// `"path": {"code": ..}`, `"path": {"content": ..}` or `"path": ".."`
fn file_from_keyed_entry(path: &str, entry: &Value) -> Option<(ProjectPath, String)> {
    let content = match entry {
        Value::String(content) => content,
        Value::Object(fields) => file_content(fields)?,
        _ => return None,
    };
    Some((ProjectPath::new(path).ok()?, content.clone()))
}

/// `{"path": .., "code": ..}` inside a `files` array
fn file_from_listed_entry(entry: &Value) -> Option<(ProjectPath, String)> {
    let fields = entry.as_object()?;
    let path = ["path", "name", "file"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str))?;
    let content = file_content(fields)?;
    Some((ProjectPath::new(path).ok()?, content.clone()))
}

fn file_content(fields: &Map<String, Value>) -> Option<&String> {
    ["code", "content"].iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(content)) => Some(content),
        _ => None,
    })
}

fn string_field(root: &Map<String, Value>, key: &str) -> Option<String> {
    root.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project_files(artifact: &CanonicalArtifact) -> Vec<(String, String)> {
        artifact
            .as_project()
            .expect("multi-file artifact")
            .files()
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn plain_source_is_wrapped_verbatim() {
        let artifact = extract("  const a = 1;\n", EncodingKind::PlainSource).unwrap();
        assert_eq!(artifact, CanonicalArtifact::single_file("  const a = 1;\n"));
    }

    #[test]
    fn blank_plain_source_fails() {
        let err = extract(" \n\t", EncodingKind::PlainSource).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::EmptyPayload);
    }

    #[test]
    fn fenced_block_is_stripped_and_trimmed() {
        let text = "```jsx\nexport default function App(){return <div/>}\n```";
        let artifact = extract(text, EncodingKind::FencedBlock).unwrap();
        assert_eq!(
            artifact,
            CanonicalArtifact::single_file("export default function App(){return <div/>}")
        );
    }

    #[test]
    fn empty_fence_is_malformed() {
        let err = extract("```jsx\n\n```", EncodingKind::FencedBlock).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::MalformedFence);
    }

    #[test]
    fn fenced_manifest_resolves_to_project() {
        let text = "```json\n{\"files\":{\"App.js\":{\"code\":\"x\"}}}\n```";
        let artifact = extract(text, EncodingKind::FencedBlock).unwrap();
        assert_eq!(project_files(&artifact), vec![("/App.js".into(), "x".into())]);
    }

    #[test]
    fn fenced_object_literal_is_source() {
        let artifact = extract("```js\n{ color: 'red' }\n```", EncodingKind::FencedBlock).unwrap();
        assert_eq!(artifact, CanonicalArtifact::single_file("{ color: 'red' }"));
    }

    #[test]
    fn fenced_json_document_is_source() {
        let text = "```json\n{\n  \"name\": \"app\"\n}\n```";
        let artifact = extract(text, EncodingKind::FencedBlock).unwrap();
        assert_eq!(artifact, CanonicalArtifact::single_file("{\n  \"name\": \"app\"\n}"));
    }

    #[test]
    fn fenced_empty_manifest_still_fails() {
        let err = extract("```json\n{\"files\":{}}\n```", EncodingKind::FencedBlock).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::EmptyProject);
    }

    #[test]
    fn envelope_unwraps_content() {
        let text = r#"{"choices":[{"message":{"content":"const x = 1;"}}]}"#;
        let artifact = extract(text, EncodingKind::ChatEnvelope).unwrap();
        assert_eq!(artifact, CanonicalArtifact::single_file("const x = 1;"));
    }

    #[test]
    fn envelope_without_content_fails() {
        let text = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let err = extract(text, EncodingKind::ChatEnvelope).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::MissingContentField);
    }

    #[test]
    fn envelope_with_fenced_manifest_uses_full_depth() {
        let inner = "```json\n{\"title\":\"Demo\",\"files\":{\"/A.js\":{\"code\":\"a\"}}}\n```";
        let text = serde_json::json!({"choices": [{"message": {"content": inner}}]}).to_string();
        let artifact = extract(&text, EncodingKind::ChatEnvelope).unwrap();
        assert_eq!(artifact.as_project().unwrap().title(), Some("Demo"));
        assert_eq!(project_files(&artifact), vec![("/A.js".into(), "a".into())]);
    }

    #[test]
    fn nesting_beyond_bound_is_plain_source() {
        fn wrap(inner: &str) -> String {
            serde_json::json!({"choices": [{"message": {"content": inner}}]}).to_string()
        }
        let innermost = wrap("deep");
        let outer = wrap(&wrap(&wrap(&innermost)));
        let artifact = extract(&outer, EncodingKind::ChatEnvelope).unwrap();
        assert_eq!(artifact, CanonicalArtifact::single_file(innermost));
    }

    #[test]
    fn nested_failure_is_folded_into_outer_error() {
        let text = r#"{"choices":[{"message":{"content":"{\"files\":{}}"}}]}"#;
        let err = extract(text, EncodingKind::ChatEnvelope).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::EmptyProject);
        assert_eq!(err.snippet(), text);
    }

    #[test]
    fn manifest_duplicate_paths_last_wins() {
        let text = r#"{"files":{"/App.js":{"code":"a"},"App.js":{"code":"b"}}}"#;
        let artifact = extract(text, EncodingKind::ProjectManifest).unwrap();
        assert_eq!(project_files(&artifact), vec![("/App.js".into(), "b".into())]);
    }

    #[test]
    fn manifest_accepts_content_field_and_bare_strings() {
        let text = r#"{"files":{"a.js":{"content":"a"},"b.js":"b","c.js":{"size":3}}}"#;
        let artifact = extract(text, EncodingKind::ProjectManifest).unwrap();
        assert_eq!(
            project_files(&artifact),
            vec![("/a.js".into(), "a".into()), ("/b.js".into(), "b".into())]
        );
    }

    #[test]
    fn manifest_passthrough_fields() {
        let text = r#"{"title":"Todo","explanation":"A list","files":{"/App.js":{"code":"x"}}}"#;
        let artifact = extract(text, EncodingKind::ProjectManifest).unwrap();
        let project = artifact.as_project().unwrap();
        assert_eq!(project.title(), Some("Todo"));
        assert_eq!(project.explanation(), Some("A list"));

        let text = r#"{"title":42,"files":{"/App.js":{"code":"x"}}}"#;
        let artifact = extract(text, EncodingKind::ProjectManifest).unwrap();
        assert_eq!(artifact.as_project().unwrap().title(), None);
    }

    #[test]
    fn empty_manifest_fails() {
        let err = extract(r#"{"files":{}}"#, EncodingKind::ProjectManifest).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::EmptyProject);
    }

    #[test]
    fn truncated_manifest_is_not_json() {
        let err = extract(r#"{"files":{"/A.js":{"cod"#, EncodingKind::ProjectManifest).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::NotJson);
    }

    #[test]
    fn unknown_falls_back_to_listed_manifest() {
        let text = r#"{"files":[{"path":"src/App.js","code":"x"},{"name":"b.css","content":"y"}]}"#;
        let artifact = extract(text, EncodingKind::Unknown).unwrap();
        assert_eq!(
            project_files(&artifact),
            vec![("/src/App.js".into(), "x".into()), ("/b.css".into(), "y".into())]
        );
    }

    #[test]
    fn unknown_failure_is_not_json() {
        let err = extract(r#"{"files":[]}"#, EncodingKind::Unknown).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::NotJson);
        let err = extract(r#"{"name":"x"}"#, EncodingKind::Unknown).unwrap_err();
        assert_eq!(err.kind(), ExtractionErrorKind::NotJson);
    }
}
