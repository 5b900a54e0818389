//! Filesystem document store
//!
//! Writes each blob under a root directory and hands back a URI built from
//! a public base URL, e.g. `http://localhost:8080/documents/<path>`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};

use crate::ports::DocumentStore;

const ADAPTER_ID: &str = "local-document-store";

#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
    base_url: String,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `path` under the root, refusing anything that could escape it
    fn resolve(&self, path: &str) -> Result<PathBuf, PortError> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(PortError::validation(format!("unsafe document path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

impl DomainPort for LocalDocumentStore {}

#[async_trait]
impl HealthCheckable for LocalDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = tokio::fs::create_dir_all(&self.root).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Healthy, latency_ms),
            Err(e) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("{}: {}", self.root.display(), e)),
        }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(
        &self,
        path: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, PortError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create document directory", e))?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| io_error("write document", e))?;

        debug!(path, content_type, size = bytes.len(), "Document stored");
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn delete(&self, path: &str) -> Result<(), PortError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path, "Document removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove document", e)),
        }
    }
}

fn io_error(operation: &str, e: std::io::Error) -> PortError {
    PortError::Internal {
        message: format!("failed to {}", operation),
        source: Some(Box::new(e)),
    }
}
