//! Streaming decode
//!
//! Accumulates payload chunks and emits [`DecodeEvent`]s: any number of
//! `Partial` events followed by exactly one `Ready` or `Failed`.
//!
//! # State machine
//!
//! ```text
//! Empty --chunk--> Accumulating --structured payload complete--> Terminated (Ready)
//!   |                   |
//!   +----end of input---+--------> Terminated (Ready | Failed)
//! ```
//!
//! The whole buffer is re-examined after every chunk. Only a structured
//! (JSON) buffer can complete early; plain and fenced payloads are
//! normalized once the source ends, so chunk boundaries never change the
//! outcome.

use crate::error::ExtractionError;
use crate::extract::extract;
use crate::fence::display_text;
use crate::normalize::Normalizer;
use crate::sniff::classify;
use forge_artifact::CanonicalArtifact;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;

/// Decoder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeState {
    /// No chunk received yet
    Empty,
    /// Chunks received, no terminal event yet
    Accumulating,
    /// Terminal event emitted; further chunks are ignored
    Terminated,
}

/// Event emitted while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// Text to show while the payload is still arriving
    Partial {
        /// Fence-stripped buffer
        visible_text: String,
    },
    /// Artifact recovered; terminal
    Ready {
        /// Recovered artifact
        artifact: CanonicalArtifact,
    },
    /// Source ended without a recoverable artifact; terminal
    Failed {
        /// Why extraction failed
        error: ExtractionError,
        /// Fence-stripped buffer, so callers can show what arrived
        best_effort_text: String,
    },
}

impl DecodeEvent {
    /// Whether this event ends the sequence
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Partial { .. })
    }
}

/// Synchronous decoder state machine
///
/// Holds nothing but the buffer; dropping it is the only teardown.
#[derive(Debug)]
pub struct DecoderCore {
    state: DecodeState,
    buffer: String,
    normalizer: Normalizer,
}

impl Default for DecoderCore {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderCore {
    /// Create decoder in the `Empty` state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DecodeState::Empty,
            buffer: String::new(),
            normalizer: Normalizer::new(),
        }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Text accumulated so far
    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk and return the events it produces
    ///
    /// Returns a `Partial` event, followed by `Ready` if the buffer now holds
    /// a complete structured payload. Chunks after termination and empty
    /// chunks produce nothing.
    pub fn feed(&mut self, chunk: &str) -> Vec<DecodeEvent> {
        if self.state == DecodeState::Terminated {
            tracing::trace!(len = chunk.len(), "ignoring chunk after termination");
            return Vec::new();
        }
        if chunk.is_empty() {
            return Vec::new();
        }

        self.buffer.push_str(chunk);
        self.state = DecodeState::Accumulating;

        let mut events = vec![DecodeEvent::Partial {
            visible_text: display_text(&self.buffer),
        }];
        if let Some(artifact) = self.try_complete() {
            self.state = DecodeState::Terminated;
            events.push(DecodeEvent::Ready { artifact });
        }
        events
    }

    /// Signal end of input
    ///
    /// Returns the terminal event, or `None` if one was already emitted.
    pub fn finish(&mut self) -> Option<DecodeEvent> {
        if self.state == DecodeState::Terminated {
            return None;
        }
        self.state = DecodeState::Terminated;

        let event = match self.normalizer.normalize(&self.buffer) {
            Ok(artifact) => DecodeEvent::Ready { artifact },
            Err(error) => DecodeEvent::Failed {
                error,
                best_effort_text: display_text(&self.buffer),
            },
        };
        Some(event)
    }

    /// Stop without a terminal event (source failure)
    fn abort(&mut self) {
        self.state = DecodeState::Terminated;
    }

    fn try_complete(&self) -> Option<CanonicalArtifact> {
        let kind = classify(&self.buffer);
        if !kind.is_structured() {
            return None;
        }
        match extract(&self.buffer, kind) {
            Ok(artifact) => Some(artifact),
            Err(error) => {
                tracing::trace!(%kind, error_kind = %error.kind(), len = self.buffer.len(), "payload incomplete");
                None
            }
        }
    }
}

/// Decoder over an asynchronous chunk source
///
/// All work happens on the polling task. Source errors are passed through
/// as `Err` and end the sequence; the source is not polled after the
/// terminal event.
#[derive(Debug)]
pub struct StreamDecoder<S> {
    source: S,
    core: DecoderCore,
    pending: VecDeque<DecodeEvent>,
}

impl<S, E> StreamDecoder<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
{
    /// Wrap a chunk source
    #[inline]
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            core: DecoderCore::new(),
            pending: VecDeque::new(),
        }
    }

    /// Current decoder state
    #[inline]
    #[must_use]
    pub fn state(&self) -> DecodeState {
        self.core.state()
    }

    /// Wait for the next event
    ///
    /// Returns `None` once the terminal event (or a source error) has been
    /// delivered.
    pub async fn next_event(&mut self) -> Option<Result<DecodeEvent, E>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.core.state() == DecodeState::Terminated {
                return None;
            }
            match self.source.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.core.feed(&chunk)),
                Some(Err(error)) => {
                    self.core.abort();
                    return Some(Err(error));
                }
                None => return self.core.finish().map(Ok),
            }
        }
    }

    /// Convert into a [`Stream`] of events
    pub fn into_stream(self) -> impl Stream<Item = Result<DecodeEvent, E>> {
        futures::stream::unfold(self, |mut decoder| async move {
            decoder.next_event().await.map(|event| (event, decoder))
        })
    }
}
