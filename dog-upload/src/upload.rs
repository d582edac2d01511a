use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

use crate::{
    naming::PlannedUpload, BatchUpdate, StorageCapability, UploadError, UploadRecord, UploadResult,
};

/// Drive one file's transfer end to end, reporting every state change on `updates`.
///
/// Returns the completed record. On failure the error is logged, a
/// [`BatchUpdate::Failed`] is sent and the error is returned; nothing is retried.
#[instrument(skip(storage, planned, updates), fields(file_id = %planned.id, path = %planned.storage_path))]
pub async fn upload_file(
    storage: &dyn StorageCapability,
    planned: PlannedUpload,
    updates: mpsc::UnboundedSender<BatchUpdate>,
) -> UploadResult<UploadRecord> {
    let PlannedUpload { id, file, storage_path } = planned;
    let record = UploadRecord::pending(id.clone(), file.clone(), storage_path.clone());
    let _ = updates.send(BatchUpdate::Inserted(record.clone()));

    let result = async {
        let handle = storage
            .begin_upload(&storage_path, file.bytes.clone(), file.content_type())
            .await?;

        handle
            .wait(&storage_path, |progress| {
                let percent = progress.percent();
                debug!(
                    bytes_transferred = progress.bytes_transferred,
                    total_bytes = progress.total_bytes,
                    percent,
                    "upload progress"
                );
                let _ = updates.send(BatchUpdate::Progress {
                    id: id.clone(),
                    progress: percent,
                });
            })
            .await?;

        let download_url = storage.download_url(&storage_path).await?;
        if download_url.is_empty() {
            return Err(UploadError::resolution(&storage_path, "empty download URL"));
        }
        Ok(download_url)
    }
    .await;

    match result {
        Ok(download_url) => {
            debug!(%download_url, "upload complete");
            let _ = updates.send(BatchUpdate::Completed {
                id,
                download_url: download_url.clone(),
            });
            Ok(record.completed(download_url))
        }
        Err(e) => {
            error!(error = %e, "upload failed");
            let _ = updates.send(BatchUpdate::Failed {
                id,
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileHandle, FileId, MemoryStorage, MemoryStorageConfig, UploadHandle};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn planned(path: &str, size: usize) -> PlannedUpload {
        PlannedUpload {
            id: FileId::new(),
            file: Arc::new(FileHandle::new("report.pdf", "application/pdf", vec![7u8; size])),
            storage_path: path.to_string(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<BatchUpdate>) -> Vec<BatchUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_upload_sends_insert_progress_and_completion() {
        let storage = MemoryStorage::with_config(MemoryStorageConfig::new().with_chunk_size(100));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let planned = planned("docs/report.pdf", 1000);
        let id = planned.id.clone();

        let record = upload_file(&storage, planned, tx).await.unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.progress, 100);
        assert_eq!(record.download_url, "memory://bucket/docs/report.pdf");

        let updates = drain(&mut rx);
        assert!(matches!(updates.first(), Some(BatchUpdate::Inserted(r)) if r.progress == 0 && r.download_url.is_empty()));
        assert!(matches!(updates.last(), Some(BatchUpdate::Completed { .. })));

        let progress: Vec<u8> = updates
            .iter()
            .filter_map(|u| match u {
                BatchUpdate::Progress { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert!(updates.iter().all(|u| u.id() == &id));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_transfer_is_logged_and_reported() {
        let storage = MemoryStorage::with_config(MemoryStorageConfig::new().with_chunk_size(100));
        storage.fail_transfer_at("docs/report.pdf", 40, "quota exceeded");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = upload_file(&storage, planned("docs/report.pdf", 1000), tx).await;

        assert!(matches!(result, Err(UploadError::Transfer { .. })));
        assert!(logs_contain("upload failed"));
        let updates = drain(&mut rx);
        assert!(matches!(updates.last(), Some(BatchUpdate::Failed { reason, .. }) if reason.contains("quota exceeded")));
        assert!(!updates.iter().any(|u| matches!(u, BatchUpdate::Completed { .. })));
    }

    #[tokio::test]
    async fn test_resolution_failure_fails_the_task() {
        let storage = MemoryStorage::new();
        storage.fail_resolution("docs/report.pdf", "forbidden");
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = upload_file(&storage, planned("docs/report.pdf", 10), tx).await;

        assert!(matches!(result, Err(UploadError::Resolution { .. })));
    }

    /// Backend that stores objects but hands back blank URLs
    struct BlankUrlStorage(MemoryStorage);

    #[async_trait]
    impl StorageCapability for BlankUrlStorage {
        async fn begin_upload(&self, path: &str, bytes: Bytes, content_type: &str) -> UploadResult<UploadHandle> {
            self.0.begin_upload(path, bytes, content_type).await
        }

        async fn download_url(&self, _path: &str) -> UploadResult<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_blank_download_url_fails_the_task() {
        let storage = BlankUrlStorage(MemoryStorage::new());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = upload_file(&storage, planned("docs/report.pdf", 10), tx).await;

        assert!(matches!(result, Err(UploadError::Resolution { ref reason, .. }) if reason == "empty download URL"));
        let updates = drain(&mut rx);
        assert!(!updates.iter().any(|u| matches!(u, BatchUpdate::Completed { .. })));
        assert!(matches!(updates.last(), Some(BatchUpdate::Failed { .. })));
    }
}
