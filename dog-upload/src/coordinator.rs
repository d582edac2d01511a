use std::sync::Arc;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    naming::{plan_uploads, IdGenerator, UuidGenerator},
    upload::upload_file,
    BatchEvent, BatchTable, BatchUpdate, FileHandle, NoopObserver, StorageCapability,
    UploadBatch, UploadObserver, UploadRecord, UploadResult, UploaderConfig,
};

/// Uploads a batch of files concurrently and reports one aggregated outcome
pub struct BatchUploader {
    storage: Arc<dyn StorageCapability>,
    ids: Arc<dyn IdGenerator>,
    observer: Arc<dyn UploadObserver>,
    config: UploaderConfig,
    events: broadcast::Sender<BatchEvent>,
    snapshots: watch::Sender<Arc<UploadBatch>>,
}

impl BatchUploader {
    /// Create a new uploader over `storage`
    pub fn new<S: StorageCapability + 'static>(storage: S, config: UploaderConfig) -> Self {
        Self::from_shared(Arc::new(storage), config)
    }

    /// Create an uploader over a storage the caller keeps a handle on
    pub fn from_shared(storage: Arc<dyn StorageCapability>, config: UploaderConfig) -> Self {
        let (events, _) = broadcast::channel(1000);
        let (snapshots, _) = watch::channel(Arc::new(UploadBatch::new()));

        Self {
            storage,
            ids: Arc::new(UuidGenerator),
            observer: Arc::new(NoopObserver),
            config,
            events,
            snapshots,
        }
    }

    /// Install the lifecycle observer
    pub fn with_observer<O: UploadObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Replace the identifier source
    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Subscribe to lifecycle events of every batch run from now on
    pub fn events(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// Watch whole-batch snapshots of the running batch.
    ///
    /// Each batch starts from an empty snapshot; after it settles the
    /// receiver keeps the last state that batch reached.
    pub fn subscribe(&self) -> watch::Receiver<Arc<UploadBatch>> {
        self.snapshots.subscribe()
    }

    /// Upload every file and return the completed batch.
    ///
    /// Fails if any single file fails; in that case the success signal is not
    /// fired. Sibling uploads are never cancelled, the call returns only after
    /// all of them have settled. An empty selection is a no-op.
    #[instrument(skip(self, files), fields(file_count = files.len(), folder = %self.config.folder_name))]
    pub async fn upload_files(&self, files: Vec<FileHandle>) -> UploadResult<UploadBatch> {
        if files.is_empty() {
            debug!("No files selected, nothing to upload");
            return Ok(UploadBatch::new());
        }
        if !self.config.multiple && files.len() > 1 {
            warn!("{} files received while multiple selection is disabled", files.len());
        }

        let planned = plan_uploads(files, &self.config, self.ids.as_ref())?;
        let file_count = planned.len();

        let selection: UploadBatch = planned
            .iter()
            .map(|p| UploadRecord::pending(p.id.clone(), p.file.clone(), p.storage_path.clone()))
            .collect();
        self.observer.on_files_selected(&selection);

        self.observer.on_batch_starting();
        self.emit(BatchEvent::Started { file_count, at: Utc::now() });

        let mut table = BatchTable::new();
        self.snapshots.send_replace(table.snapshot());
        let (tx, mut rx) = mpsc::unbounded_channel::<BatchUpdate>();
        let fan_out = self.config.fan_out(file_count);
        let storage = self.storage.as_ref();

        let uploads = async move {
            let mut outcomes: Vec<(usize, UploadResult<UploadRecord>)> = stream::iter(planned.into_iter().enumerate())
                .map(|(index, p)| {
                    let tx = tx.clone();
                    async move { (index, upload_file(storage, p, tx).await) }
                })
                .buffer_unordered(fan_out)
                .collect()
                .await;
            drop(tx);
            // report the first failure in input order, not completion order
            outcomes.sort_by_key(|(index, _)| *index);
            outcomes
        };

        let apply = async {
            while let Some(update) = rx.recv().await {
                self.emit_for_update(&update);
                if let Some(snapshot) = table.apply(update) {
                    self.observer.on_batch_updated(&snapshot);
                    self.snapshots.send_replace(snapshot);
                }
            }
        };

        let (outcomes, ()) = tokio::join!(uploads, apply);
        let batch = table.into_batch();

        let mut failures = outcomes.into_iter().filter_map(|(_, outcome)| outcome.err());
        if let Some(first) = failures.next() {
            let failed_count = 1 + failures.count();
            error!(failed_count, error = %first, "Batch upload failed");
            self.emit(BatchEvent::Failed {
                failed_count,
                error: first.to_string(),
                at: Utc::now(),
            });
            return Err(first);
        }

        info!("Uploaded {} files", batch.len());
        self.emit(BatchEvent::Succeeded { file_count: batch.len(), at: Utc::now() });
        self.observer.on_batch_succeeded(batch.clone());

        Ok(batch)
    }

    fn emit_for_update(&self, update: &BatchUpdate) {
        let event = match update {
            BatchUpdate::Completed { id, download_url } => BatchEvent::FileCompleted {
                file_id: id.clone(),
                download_url: download_url.clone(),
                at: Utc::now(),
            },
            BatchUpdate::Failed { id, reason } => BatchEvent::FileFailed {
                file_id: id.clone(),
                reason: reason.clone(),
                at: Utc::now(),
            },
            _ => return,
        };
        self.emit(event);
    }

    fn emit(&self, event: BatchEvent) {
        debug!(event = event.event_name(), "Batch event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
