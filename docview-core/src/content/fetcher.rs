//! ``src/content/fetcher.rs``
//! ============================================================================
//! # Resource fetchers
//!
//! Linked documents are addressed by application-relative paths such as
//! `/documents/intro.md`. A [`ResourceFetcher`] turns such a path into text,
//! either from a local directory or over HTTP. The same fetcher serves the
//! rendered view and the raw text loaded for editing.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::{DocumentSourceKind, DocumentsConfig};
use crate::error::{AppError, FetchError};

#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Returns the full text behind `path`.
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Short description for the status bar.
    fn describe(&self) -> String;
}

/// Builds the fetcher selected by `[documents] source`.
pub fn fetcher_from_config(config: &DocumentsConfig) -> Result<Arc<dyn ResourceFetcher>, AppError> {
    let fetcher: Arc<dyn ResourceFetcher> = match config.source {
        DocumentSourceKind::Directory => Arc::new(DirectoryFetcher::new(&config.root)),
        DocumentSourceKind::Http => Arc::new(HttpFetcher::new(
            &config.base_url,
            config.fetch_timeout,
        )?),
    };
    info!("Using document source: {}", fetcher.describe());
    Ok(fetcher)
}

/// Reads documents below a local root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps an application-relative path onto the root, refusing anything
    /// that is not a plain sequence of names.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(FetchError::InvalidPath(path.into()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for DirectoryFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let full_path = self.resolve(path)?;
        debug!("Reading {}", full_path.display());
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| FetchError::Io {
                path: path.into(),
                kind: e.kind(),
            })
    }

    fn describe(&self) -> String {
        format!("dir {}", self.root.display())
    }
}

/// Issues `GET <base_url><path>` and expects a 2xx text body.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Other(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::network(path, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {} returned {}", url, status);
            return Err(FetchError::status(path, status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::network(path, e.to_string()))
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}
