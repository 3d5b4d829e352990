//! Generation session
//!
//! One session per generation target. `generate()` runs the gate, calls the
//! backend, decodes its output and persists the artifact. Failed attempts
//! leave the counter, the ledger and the previous artifact untouched.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─► Gated ─► Requesting ─► Decoding ─► Persisted
//!           │          │             │
//!           └──────────┴─────────────┴──────► Errored
//! ```

use crate::backend::{BackendResponse, ChunkSource, Collaborators, DebitOutcome};
use crate::error::{GateError, SessionError, TransportError};
use crate::types::{
    AccountId, DesignPrompt, GenerationOutcome, GenerationRequest, SessionConfig, SessionId,
    SessionStatus, TargetId,
};
use chrono::Utc;
use forge_artifact::CanonicalArtifact;
use forge_ingest::{display_text, DecodeEvent, Normalizer, StreamDecoder};
use parking_lot::Mutex;
use tokio::sync::watch;

/// Mutable session state; never locked across an await point
#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    regeneration_count: u32,
    current: Option<CanonicalArtifact>,
}

/// Counter and context captured when the gate admits an attempt
#[derive(Debug)]
struct Admission {
    regeneration_count: u32,
    previous: Option<CanonicalArtifact>,
}

/// Marks the session `Errored` unless the attempt settles first
///
/// Dropping the `generate` future mid-flight drops this guard.
struct InFlightGuard<'a> {
    state: &'a Mutex<SessionState>,
    armed: bool,
}

impl<'a> InFlightGuard<'a> {
    fn arm(state: &'a Mutex<SessionState>) -> Self {
        Self { state, armed: true }
    }

    fn persisted(mut self, outcome: &GenerationOutcome) {
        self.armed = false;
        let mut state = self.state.lock();
        state.status = SessionStatus::Persisted;
        state.regeneration_count = outcome.regeneration_count;
        state.current = Some(outcome.artifact.clone());
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().status = SessionStatus::Errored;
        }
    }
}

/// Gate and orchestration around generation attempts for one target
pub struct GenerationSession {
    id: SessionId,
    target_id: TargetId,
    account_id: AccountId,
    config: SessionConfig,
    collaborators: Collaborators,
    state: Mutex<SessionState>,
    preview: watch::Sender<String>,
}

impl GenerationSession {
    /// Open a session for `target_id`
    ///
    /// Loads the existing record, if any; a target with a record is past
    /// its first generation.
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] for an invalid config and
    /// [`SessionError::Store`] if the record cannot be loaded.
    pub async fn open(
        target_id: TargetId,
        account_id: AccountId,
        config: SessionConfig,
        collaborators: Collaborators,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let current = collaborators.store.load_artifact(&target_id).await?;
        let id = SessionId::new();
        tracing::debug!(
            session = %id,
            target = %target_id,
            has_record = current.is_some(),
            "session opened"
        );

        let (preview, _) = watch::channel(String::new());
        Ok(Self {
            id,
            target_id,
            account_id,
            config,
            collaborators,
            state: Mutex::new(SessionState {
                status: SessionStatus::Idle,
                regeneration_count: 0,
                current,
            }),
            preview,
        })
    }

    /// Restore a counter kept by the caller across sessions
    #[must_use]
    pub fn with_regeneration_count(self, count: u32) -> Self {
        self.state.lock().regeneration_count = count;
        self
    }

    /// Session ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Target this session generates for
    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Successful generations so far
    #[must_use]
    pub fn regeneration_count(&self) -> u32 {
        self.state.lock().regeneration_count
    }

    /// Regenerations left before the limit
    #[must_use]
    pub fn remaining_regenerations(&self) -> u32 {
        self.config
            .max_regenerations
            .saturating_sub(self.regeneration_count())
    }

    /// Last persisted artifact
    #[must_use]
    pub fn current_artifact(&self) -> Option<CanonicalArtifact> {
        self.state.lock().current.clone()
    }

    /// Watch the best-effort text of the attempt in progress
    #[must_use]
    pub fn subscribe_preview(&self) -> watch::Receiver<String> {
        self.preview.subscribe()
    }

    /// Run one generation attempt
    ///
    /// The artifact is written to the record store before credits are
    /// debited. If the debit then fails, the store holds the new artifact
    /// while [`current_artifact`](Self::current_artifact) keeps the previous
    /// one; it only changes on a successful attempt. An artifact identical to
    /// the current one is not written again and is reported as `unchanged`.
    ///
    /// # Errors
    /// - [`GateError`] if the attempt is rejected before the backend is
    ///   contacted, or if the debit fails after persisting
    /// - [`TransportError`] on backend or network failure
    /// - [`SessionError::Extraction`] if the output holds no artifact
    /// - store or ledger failures
    pub async fn generate(&self, prompt: DesignPrompt) -> Result<GenerationOutcome, SessionError> {
        let admission = self.enter_gate()?;
        let guard = InFlightGuard::arm(&self.state);

        match self.attempt(prompt, admission).await {
            Ok(outcome) => {
                guard.persisted(&outcome);
                tracing::info!(
                    session = %self.id,
                    target = %self.target_id,
                    regeneration_count = outcome.regeneration_count,
                    credits_remaining = outcome.credits_remaining,
                    unchanged = outcome.unchanged,
                    "artifact persisted"
                );
                Ok(outcome)
            }
            Err(error) => {
                drop(guard);
                tracing::warn!(
                    session = %self.id,
                    target = %self.target_id,
                    %error,
                    "generation attempt failed"
                );
                Err(error)
            }
        }
    }

    /// Synchronous single-flight check
    fn enter_gate(&self) -> Result<Admission, GateError> {
        let mut state = self.state.lock();
        if state.status.is_in_flight() {
            tracing::warn!(session = %self.id, status = ?state.status, "generation already in progress");
            return Err(GateError::AlreadyInProgress);
        }
        state.status = SessionStatus::Gated;
        Ok(Admission {
            regeneration_count: state.regeneration_count,
            previous: state.current.clone(),
        })
    }

    async fn attempt(
        &self,
        prompt: DesignPrompt,
        admission: Admission,
    ) -> Result<GenerationOutcome, SessionError> {
        self.check_gate(&admission).await?;
        let previous_fingerprint = admission.previous.as_ref().map(CanonicalArtifact::fingerprint);

        let request = GenerationRequest {
            session_id: self.id,
            target_id: self.target_id.clone(),
            prompt,
            previous: admission.previous,
        };
        tracing::info!(
            session = %self.id,
            target = %self.target_id,
            regeneration = request.is_regeneration(),
            "generation accepted"
        );

        self.set_status(SessionStatus::Requesting);
        self.preview.send_replace(String::new());
        let response = self
            .collaborators
            .backend
            .request_generation(&request)
            .await?;

        let artifact = match response {
            BackendResponse::Complete(payload) => self.decode_complete(&payload)?,
            BackendResponse::Streaming(chunks) => self.decode_stream(chunks).await?,
        };

        let fingerprint = artifact.fingerprint();
        let unchanged = previous_fingerprint == Some(fingerprint);
        if unchanged {
            tracing::debug!(
                session = %self.id,
                fingerprint = %fingerprint.short(),
                "artifact unchanged, skipping store write"
            );
        } else {
            self.collaborators
                .store
                .save_artifact(&self.target_id, &artifact)
                .await?;
        }
        let persisted_at = Utc::now();

        let cost = self.config.generation_cost;
        match self
            .collaborators
            .ledger
            .try_debit(&self.account_id, cost)
            .await?
        {
            DebitOutcome::Debited { remaining } => Ok(GenerationOutcome {
                artifact,
                regeneration_count: admission.regeneration_count.saturating_add(1),
                credits_remaining: remaining,
                unchanged,
                persisted_at,
            }),
            DebitOutcome::Insufficient { balance } => {
                tracing::warn!(
                    session = %self.id,
                    balance,
                    cost,
                    "balance dropped below cost during generation"
                );
                Err(GateError::InsufficientCredits { balance, cost }.into())
            }
        }
    }

    /// Credit and regeneration checks; no backend contact
    async fn check_gate(&self, admission: &Admission) -> Result<(), SessionError> {
        let cost = self.config.generation_cost;
        let balance = self.collaborators.ledger.balance(&self.account_id).await?;
        if balance < cost {
            tracing::warn!(session = %self.id, balance, cost, "insufficient credits");
            return Err(GateError::InsufficientCredits { balance, cost }.into());
        }

        let first_generation = admission.previous.is_none();
        let max = self.config.max_regenerations;
        if admission.regeneration_count >= max && !first_generation {
            tracing::warn!(
                session = %self.id,
                count = admission.regeneration_count,
                max,
                "regeneration limit reached"
            );
            return Err(GateError::RegenerationLimitReached {
                count: admission.regeneration_count,
                max,
            }
            .into());
        }
        Ok(())
    }

    fn decode_complete(&self, payload: &str) -> Result<CanonicalArtifact, SessionError> {
        self.set_status(SessionStatus::Decoding);
        let best_effort_text = display_text(payload);
        self.preview.send_replace(best_effort_text.clone());
        Normalizer::new().normalize(payload).map_err(|error| {
            tracing::debug!(session = %self.id, %error, "complete payload not extractable");
            SessionError::Extraction {
                error,
                best_effort_text,
            }
        })
    }

    async fn decode_stream(&self, chunks: ChunkSource) -> Result<CanonicalArtifact, SessionError> {
        let idle = self.config.chunk_idle_timeout();
        let mut decoder = StreamDecoder::new(chunks);

        loop {
            let event = tokio::time::timeout(idle, decoder.next_event())
                .await
                .map_err(|_| TransportError::IdleTimeout {
                    secs: self.config.chunk_idle_timeout_secs,
                })?;
            let Some(event) = event else {
                return Err(TransportError::Network("chunk source closed without a result".into()).into());
            };

            match event? {
                DecodeEvent::Partial { visible_text } => {
                    self.set_status(SessionStatus::Decoding);
                    tracing::trace!(session = %self.id, len = visible_text.len(), "partial output");
                    self.preview.send_replace(visible_text);
                }
                DecodeEvent::Ready { artifact } => return Ok(artifact),
                DecodeEvent::Failed {
                    error,
                    best_effort_text,
                } => {
                    tracing::debug!(session = %self.id, %error, "stream ended without an artifact");
                    return Err(SessionError::Extraction {
                        error,
                        best_effort_text,
                    });
                }
            }
        }
    }

    fn set_status(&self, status: SessionStatus) {
        self.state.lock().status = status;
    }
}

impl std::fmt::Debug for GenerationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GenerationSession")
            .field("id", &self.id)
            .field("target_id", &self.target_id)
            .field("status", &state.status)
            .field("regeneration_count", &state.regeneration_count)
            .finish_non_exhaustive()
    }
}
