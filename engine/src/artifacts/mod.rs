//! Artifact persistence
//!
//! A finished analysis is written as pretty-printed JSON to
//! `<dir>/seo_core_<domain>_<id prefix>.json`. The name depends only on the
//! target and the task id, so the same task always lands on the same file.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name prefix for artifacts
pub const ARTIFACT_PREFIX: &str = "seo_core";

/// Number of task id characters in the file name
pub const TASK_ID_PREFIX_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable storage for validated artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `artifact` and return where it was stored
    async fn persist(
        &self,
        artifact: &Value,
        target: &str,
        task_id: &str,
    ) -> Result<PathBuf, ArtifactError>;
}

/// Reduce a target address to a bare domain usable in a file name.
///
/// `https://www.example.com/path?q=1` becomes `example.com`. Characters
/// outside `[A-Za-z0-9.-]` (a port colon, for instance) become `_`.
pub fn normalize_domain(target: &str) -> String {
    let trimmed = target.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let domain: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if domain.is_empty() {
        "unknown".to_string()
    } else {
        domain
    }
}

/// Deterministic artifact file name for a task
pub fn artifact_file_name(target: &str, task_id: &str) -> String {
    let id_prefix: String = task_id.chars().take(TASK_ID_PREFIX_LEN).collect();
    format!(
        "{}_{}_{}.json",
        ARTIFACT_PREFIX,
        normalize_domain(target),
        id_prefix
    )
}

/// Writes artifacts into a directory on the local file system
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, target: &str, task_id: &str) -> PathBuf {
        self.dir.join(artifact_file_name(target, task_id))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn persist(
        &self,
        artifact: &Value,
        target: &str,
        task_id: &str,
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.path_for(target, task_id);

        // serde_json writes UTF-8 and leaves non-ASCII characters unescaped
        let body = serde_json::to_string_pretty(artifact)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ArtifactError::Io {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Artifact written to {:?}", path);
        Ok(path)
    }
}
