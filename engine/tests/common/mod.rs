#![allow(dead_code)]

use async_trait::async_trait;
use seocore_engine::artifacts::{ArtifactError, ArtifactStore, FsArtifactStore};
use seocore_engine::conductor::Orchestrator;
use seocore_engine::fetcher::ContentFetcher;
use seocore_engine::llm::{CompletionClient, LLMError, Message};
use seocore_engine::registry::{InMemoryTaskStore, TaskStore};
use serde_json::Value;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Completion client that replays canned responses in order and records
/// every conversation it was asked to complete.
pub struct ScriptedLLM {
    responses: Mutex<VecDeque<Result<String, LLMError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLLM {
    pub fn new(responses: Vec<Result<String, LLMError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answers(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedLLM {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[Message], _model: &str) -> Result<String, LLMError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::InvalidRequest("script exhausted".to_string())))
    }
}

/// Completion client that panics on every call
pub struct PanickingLLM;

#[async_trait]
impl CompletionClient for PanickingLLM {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn complete(&self, _messages: &[Message], _model: &str) -> Result<String, LLMError> {
        panic!("boom")
    }
}

/// Fetcher returning fixed content and recording requested addresses
pub struct StaticFetcher {
    content: String,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> String {
        self.requested.lock().unwrap().push(url.to_string());
        self.content.clone()
    }
}

/// Artifact store whose writes always fail
pub struct BrokenArtifactStore;

#[async_trait]
impl ArtifactStore for BrokenArtifactStore {
    async fn persist(
        &self,
        _artifact: &Value,
        _target: &str,
        _task_id: &str,
    ) -> Result<PathBuf, ArtifactError> {
        Err(ArtifactError::Io {
            path: PathBuf::from("/nowhere"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Orchestrator over an in-memory registry writing artifacts into `dir`
pub fn orchestrator(
    llm: Arc<dyn CompletionClient>,
    fetcher: Arc<dyn ContentFetcher>,
    dir: &Path,
) -> Orchestrator {
    orchestrator_with_store(llm, fetcher, Arc::new(FsArtifactStore::new(dir)))
}

pub fn orchestrator_with_store(
    llm: Arc<dyn CompletionClient>,
    fetcher: Arc<dyn ContentFetcher>,
    artifacts: Arc<dyn ArtifactStore>,
) -> Orchestrator {
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    Orchestrator::new(store, llm, fetcher, artifacts, "test-model")
}
