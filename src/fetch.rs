//! Resource fetching
//!
//! Cue tracks and manifests are addressed by identifier, which is usually an
//! HTTP(S) URL. Local paths and `file://` identifiers are read from disk so
//! manifests can be inspected offline.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::CueError;

/// Fetches the body of a resource as text.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_text(&self, resource_id: &str) -> Result<String, CueError>;
}

/// Fetches `http://` and `https://` identifiers over the network and
/// everything else from the local filesystem.
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Creates a fetcher without a request timeout; a hung request never
    /// completes.
    pub fn new() -> Result<Self, CueError> {
        Self::build(None)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CueError> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self, CueError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CueError::network("<client>", e))?;
        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String, CueError> {
        // Accept is sent as observed; it does not match the WebVTT body.
        let response = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "text/plain")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CueError::network(url, e))?;

        let response = response
            .error_for_status()
            .map_err(|e| CueError::network(url, e))?;

        response.text().await.map_err(|e| CueError::network(url, e))
    }

    async fn fetch_local(&self, path: &str) -> Result<String, CueError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CueError::network(path, e))
    }
}

#[async_trait]
impl ResourceFetcher for DefaultFetcher {
    async fn fetch_text(&self, resource_id: &str) -> Result<String, CueError> {
        tracing::debug!("Fetching {}", resource_id);
        if is_remote(resource_id) {
            self.fetch_remote(resource_id).await
        } else {
            let path = resource_id.strip_prefix("file://").unwrap_or(resource_id);
            self.fetch_local(path).await
        }
    }
}

fn is_remote(resource_id: &str) -> bool {
    let lower = resource_id.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
