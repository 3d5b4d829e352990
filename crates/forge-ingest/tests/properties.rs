//! Property tests for normalization and streaming decode.
//!
//! - Purity: normalizing the same text twice yields identical results.
//! - Fence round-trip: fenced plain source comes back trimmed.
//! - Streaming equivalence: any split of a payload into non-empty chunks
//!   ends in the same outcome as normalizing the whole payload.

use forge_artifact::CanonicalArtifact;
use forge_ingest::{normalize, DecodeEvent, DecoderCore};
use proptest::prelude::*;

/// Payloads covering every encoding, valid and invalid.
fn payload() -> impl Strategy<Value = String> {
    let source = "[a-zA-Z0-9 ;=(){}<>/\n]{1,40}";
    prop_oneof![
        source.prop_map(|s| format!("export const x = 1;\n{s}")),
        (source, "[a-z]{0,5}").prop_map(|(s, lang)| format!("```{lang}\n{s}\n```")),
        source.prop_map(|s| {
            serde_json::json!({"choices": [{"message": {"content": s}}]}).to_string()
        }),
        (source, source).prop_map(|(a, b)| {
            serde_json::json!({
                "title": "Demo",
                "files": {"/App.js": {"code": a}, "styles.css": {"code": b}}
            })
            .to_string()
        }),
        Just(r#"{"files":{}}"#.to_string()),
        Just(r#"{"choices":[{"message":{"role":"assistant"}}]}"#.to_string()),
        Just(r#"{"files":{"/A.js":{"code":"x"}"#.to_string()),
        Just("```\n\n```".to_string()),
    ]
}

/// Split `text` into non-empty chunks at the given char offsets.
fn split_at_offsets(text: &str, offsets: &[usize]) -> Vec<String> {
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();
    let mut cuts: Vec<usize> = offsets
        .iter()
        .filter(|_| !boundaries.is_empty())
        .map(|o| boundaries[o % boundaries.len()])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(text[start..cut].to_string());
        start = cut;
    }
    chunks.push(text[start..].to_string());
    chunks
}

fn decode(chunks: &[String]) -> Vec<DecodeEvent> {
    let mut core = DecoderCore::new();
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(core.feed(chunk));
    }
    events.extend(core.finish());
    events
}

proptest! {
    #[test]
    fn normalize_is_pure(text in payload()) {
        prop_assert_eq!(normalize(&text), normalize(&text));
    }

    #[test]
    fn fence_round_trip(
        code in "[a-zA-Z0-9 ;:=(){}<>/\n]{0,60}[a-zA-Z0-9;}]",
        lang in "[a-z]{0,6}",
    ) {
        let text = format!("```{lang}\n{code}\n```");
        prop_assert_eq!(
            normalize(&text).unwrap(),
            CanonicalArtifact::single_file(code.trim())
        );
    }

    #[test]
    fn streaming_matches_whole_payload(
        text in payload(),
        offsets in prop::collection::vec(any::<usize>(), 0..8),
    ) {
        let chunks = split_at_offsets(&text, &offsets);
        prop_assert_eq!(chunks.concat(), text.clone());

        let events = decode(&chunks);
        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        prop_assert_eq!(terminal.len(), 1);
        prop_assert!(events.last().is_some_and(DecodeEvent::is_terminal));

        match (normalize(&text), events.last()) {
            (Ok(expected), Some(DecodeEvent::Ready { artifact })) => {
                prop_assert_eq!(artifact, &expected);
            }
            (Err(_), Some(DecodeEvent::Failed { .. })) => {}
            (whole, last) => {
                prop_assert!(false, "whole payload gave {:?}, stream ended with {:?}", whole, last);
            }
        }
    }
}

#[test]
fn chunk_count_does_not_change_outcome() {
    let text = r#"{"choices":[{"message":{"content":"```jsx\nconst App = () => <div/>;\n```"}}]}"#;
    let whole = normalize(text).unwrap();

    for size in 1..=text.len() {
        let chunks: Vec<String> = text
            .as_bytes()
            .chunks(size)
            .map(|c| String::from_utf8(c.to_vec()).unwrap())
            .collect();
        match decode(&chunks).last() {
            Some(DecodeEvent::Ready { artifact }) => assert_eq!(artifact, &whole),
            other => panic!("chunk size {size}: unexpected terminal {other:?}"),
        }
    }
}
