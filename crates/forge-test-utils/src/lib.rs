//! Testing utilities for Forge workspace
//!
//! Scripted backends, fixtures and tracing setup shared by integration tests.

#![allow(missing_docs)]

use forge_artifact::{CanonicalArtifact, FileMap, Project, ProjectPath};
use forge_session::{
    AccountId, BackendResponse, Collaborators, GenerationBackend, GenerationRequest,
    InMemoryLedger, InMemoryRecordStore, TargetId, TransportError,
};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// One canned backend reply
#[derive(Debug, Clone)]
pub enum Script {
    Complete(String),
    Chunks(Vec<String>),
    Fail(TransportError),
    /// Accept the request, then never send a chunk
    Stall,
}

/// Backend replaying canned replies in order
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Hold every request until `gate` is notified
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().push_back(script);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn request_generation(
        &self,
        request: &GenerationRequest,
    ) -> Result<BackendResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let script = self.scripts.lock().pop_front();
        match script {
            Some(Script::Complete(payload)) => Ok(BackendResponse::Complete(payload)),
            Some(Script::Chunks(chunks)) => Ok(BackendResponse::Streaming(
                futures::stream::iter(chunks.into_iter().map(Ok)).boxed(),
            )),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Stall) => Ok(BackendResponse::Streaming(futures::stream::pending().boxed())),
            None => Err(TransportError::Backend {
                status: 500,
                message: "no scripted response".to_string(),
            }),
        }
    }
}

/// Split `payload` into chunks of at most `size` chars
pub fn chunked(payload: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = payload.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Manifest JSON for `files`
pub fn manifest_json(title: &str, files: &[(&str, &str)]) -> String {
    let entries: Vec<String> = files
        .iter()
        .map(|(path, code)| format!("{path:?}:{{\"code\":{code:?}}}"))
        .collect();
    format!("{{\"title\":{title:?},\"files\":{{{}}}}}", entries.join(","))
}

pub fn create_test_project(files: &[(&str, &str)]) -> CanonicalArtifact {
    let map: FileMap = files
        .iter()
        .map(|(path, code)| (ProjectPath::new(path).unwrap(), (*code).to_string()))
        .collect();
    CanonicalArtifact::MultiFileProject(Project::new(map).unwrap())
}

/// Backend, store and ledger wired together for one account
pub struct TestHarness {
    pub backend: Arc<ScriptedBackend>,
    pub store: Arc<InMemoryRecordStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub target: TargetId,
    pub account: AccountId,
}

impl TestHarness {
    pub fn new(backend: ScriptedBackend, balance: u64) -> Self {
        let account = AccountId::new("test-account");
        Self {
            backend: Arc::new(backend),
            store: Arc::new(InMemoryRecordStore::new()),
            ledger: Arc::new(InMemoryLedger::new().with_account(account.clone(), balance)),
            target: TargetId::new("test-target"),
            account,
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.backend.clone(),
            self.store.clone(),
            self.ledger.clone(),
        )
    }
}

/// Install a test-writer subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
