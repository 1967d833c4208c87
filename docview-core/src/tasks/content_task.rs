//! ``src/tasks/content_task.rs``
//! ============================================================================
//! # Background content loading
//!
//! Fetches linked document text off the event loop and reports back through
//! the task channel. Every request carries the id the session issued for it;
//! the session drops any result whose id is no longer current.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use doctree::{FilePath, NodeId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::content::fetcher::ResourceFetcher;
use crate::content::upload::read_upload;
use crate::controller::event_loop::TaskResult;

/// Why a document is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// Rendered into the content pane.
    Display,
    /// Raw text loaded into the editor.
    Edit,
}

#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub request_id: u64,
    pub node_id: NodeId,
    pub path: FilePath,
    pub purpose: FetchPurpose,
}

/// Spawns a fetch for `request`. Nothing is reported if `cancel` fires first.
pub fn spawn_content_fetch(
    request: ContentRequest,
    fetcher: Arc<dyn ResourceFetcher>,
    cancel: CancellationToken,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) {
    let span = info_span!(
        "content_fetch",
        request_id = request.request_id,
        node_id = %request.node_id,
        path = %request.path,
        purpose = ?request.purpose,
    );

    tokio::spawn(
        async move {
            let started = Instant::now();

            let result = tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("Fetch superseded before completion");
                    return;
                }
                result = fetcher.fetch_text(request.path.as_str()) => result,
            };

            info!(
                ok = result.is_ok(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Content fetch finished"
            );

            if task_tx
                .send(TaskResult::ContentFetched { request, result })
                .is_err()
            {
                debug!("Task channel closed, dropping fetch result");
            }
        }
        .instrument(span),
    );
}

/// Reads a file picked in the add-document form.
pub fn spawn_upload_read(
    request_id: u64,
    path: Option<PathBuf>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) {
    tokio::spawn(async move {
        let result = read_upload(path.as_deref()).await;
        debug!(request_id, ok = result.is_ok(), "Upload read finished");
        if task_tx
            .send(TaskResult::UploadRead { request_id, result })
            .is_err()
        {
            debug!(request_id, "Task channel closed, dropping upload result");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct SlowFetcher;

    #[async_trait]
    impl ResourceFetcher for SlowFetcher {
        async fn fetch_text(&self, _path: &str) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("late".into())
        }

        fn describe(&self) -> String {
            "slow".into()
        }
    }

    struct EchoFetcher;

    #[async_trait]
    impl ResourceFetcher for EchoFetcher {
        async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
            Ok(format!("body of {path}"))
        }

        fn describe(&self) -> String {
            "echo".into()
        }
    }

    fn request(id: u64) -> ContentRequest {
        ContentRequest {
            request_id: id,
            node_id: NodeId::from("1"),
            path: FilePath::parse("/documents/introduction.md").unwrap(),
            purpose: FetchPurpose::Display,
        }
    }

    #[tokio::test]
    async fn result_is_reported_with_request_id() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_content_fetch(request(3), Arc::new(EchoFetcher), CancellationToken::new(), tx);

        match rx.recv().await.unwrap() {
            TaskResult::ContentFetched { request, result } => {
                assert_eq!(request.request_id, 3);
                assert_eq!(result.unwrap(), "body of /documents/introduction.md");
            }
            other => panic!("unexpected task result {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_fetch_reports_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        spawn_content_fetch(request(1), Arc::new(SlowFetcher), cancel.clone(), tx);

        cancel.cancel();
        // sender is dropped by the finished task, so the channel closes empty
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn upload_read_survives_closed_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes").unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        spawn_upload_read(4, Some(path.clone()), tx);

        // the task finishes quietly; a fresh channel still gets its result
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_upload_read(5, Some(path), tx);
        match rx.recv().await.unwrap() {
            TaskResult::UploadRead { request_id, result } => {
                assert_eq!(request_id, 5);
                assert_eq!(result.unwrap(), "# Notes");
            }
            other => panic!("unexpected task result {other:?}"),
        }
    }
}
