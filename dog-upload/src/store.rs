use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::{UploadError, UploadResult};

/// Blob storage as seen by the uploader - implemented by storage backends
#[async_trait]
pub trait StorageCapability: Send + Sync {
    /// Start transferring `bytes` to `path`; progress is reported through the returned handle
    async fn begin_upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> UploadResult<UploadHandle>;

    /// Publicly retrievable URL of the object stored at `path`
    async fn download_url(&self, path: &str) -> UploadResult<String>;
}

/// Cumulative transfer state reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, total_bytes: u64) -> Self {
        Self {
            bytes_transferred,
            total_bytes,
        }
    }

    /// Rounded percentage, kept inside `0..=100` whatever the backend reports
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 0;
        }
        let ratio = self.bytes_transferred as f64 / self.total_bytes as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Event emitted by an in-flight transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress(TransferProgress),
    Completed,
    Failed(String),
}

/// Observable, awaitable handle on one transfer
#[derive(Debug)]
pub struct UploadHandle {
    events: mpsc::UnboundedReceiver<TransferEvent>,
}

impl UploadHandle {
    /// Linked reporter/handle pair for backend implementations
    pub fn channel() -> (TransferReporter, UploadHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TransferReporter { tx }, UploadHandle { events: rx })
    }

    /// Next event, or `None` once the backend has dropped its reporter
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        self.events.recv().await
    }

    /// Drive the transfer to its end, calling `on_progress` for every progress event in order.
    ///
    /// A reporter dropped without a terminal event counts as a failure.
    pub async fn wait<F>(mut self, path: &str, mut on_progress: F) -> UploadResult<()>
    where
        F: FnMut(TransferProgress),
    {
        while let Some(event) = self.next_event().await {
            match event {
                TransferEvent::Progress(progress) => on_progress(progress),
                TransferEvent::Completed => return Ok(()),
                TransferEvent::Failed(reason) => return Err(UploadError::transfer(path, reason)),
            }
        }
        Err(UploadError::transfer(path, "transfer ended without completing"))
    }
}

/// Sending side of an [`UploadHandle`]
#[derive(Debug, Clone)]
pub struct TransferReporter {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl TransferReporter {
    /// Report cumulative progress. Returns false once nobody is listening.
    pub fn progress(&self, bytes_transferred: u64, total_bytes: u64) -> bool {
        self.tx
            .send(TransferEvent::Progress(TransferProgress::new(bytes_transferred, total_bytes)))
            .is_ok()
    }

    pub fn complete(self) {
        let _ = self.tx.send(TransferEvent::Completed);
    }

    pub fn fail<S: Into<String>>(self, reason: S) {
        let _ = self.tx.send(TransferEvent::Failed(reason.into()));
    }
}
