use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    MemoryStorageConfig, StorageCapability, TransferReporter, UploadError, UploadHandle,
    UploadResult,
};

/// Object held by [`MemoryStorage`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
enum Fault {
    /// Abort the transfer once this percentage has been reported
    Transfer { at_percent: u8, reason: String },
    /// Transfer succeeds but the download URL cannot be resolved
    Resolution { reason: String },
}

/// In-memory storage backend for testing and development.
///
/// Transfers run on a spawned task and report progress chunk by chunk.
/// Failures can be injected per path.
#[derive(Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    faults: Arc<RwLock<HashMap<String, Fault>>>,
    config: MemoryStorageConfig,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_config(MemoryStorageConfig::default())
    }

    pub fn with_config(config: MemoryStorageConfig) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            faults: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Make the transfer to `path` fail after reporting `at_percent`
    pub fn fail_transfer_at<P: Into<String>, R: Into<String>>(&self, path: P, at_percent: u8, reason: R) {
        self.faults.write().insert(
            path.into(),
            Fault::Transfer {
                at_percent: at_percent.min(100),
                reason: reason.into(),
            },
        );
    }

    /// Make download URL resolution for `path` fail
    pub fn fail_resolution<P: Into<String>, R: Into<String>>(&self, path: P, reason: R) {
        self.faults.write().insert(path.into(), Fault::Resolution { reason: reason.into() });
    }

    pub fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.read().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    async fn transfer(
        objects: Arc<RwLock<HashMap<String, StoredObject>>>,
        config: MemoryStorageConfig,
        fault: Option<Fault>,
        path: String,
        bytes: Bytes,
        content_type: String,
        reporter: TransferReporter,
    ) {
        let total = bytes.len() as u64;
        let chunk = config.chunk_size.max(1) as u64;
        let fail_at = match &fault {
            Some(Fault::Transfer { at_percent, reason }) => Some((*at_percent as u64, reason.clone())),
            _ => None,
        };

        let mut sent = 0u64;
        while sent < total {
            if let Some(delay) = config.chunk_delay {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }

            let next = (sent + chunk).min(total);
            if let Some((at_percent, reason)) = &fail_at {
                if next * 100 >= at_percent * total {
                    reporter.progress(total * at_percent / 100, total);
                    reporter.fail(reason.clone());
                    return;
                }
            }

            sent = next;
            if !reporter.progress(sent, total) {
                // handle dropped, nobody is waiting for this transfer
                return;
            }
        }

        if let Some((_, reason)) = fail_at {
            reporter.fail(reason);
            return;
        }

        objects.write().insert(
            path,
            StoredObject {
                bytes,
                content_type,
                stored_at: Utc::now(),
            },
        );
        reporter.complete();
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageCapability for MemoryStorage {
    async fn begin_upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> UploadResult<UploadHandle> {
        if path.is_empty() {
            return Err(UploadError::invalid("storage path must not be empty"));
        }

        let (reporter, handle) = UploadHandle::channel();
        let fault = self.faults.read().get(path).cloned();

        tokio::spawn(Self::transfer(
            self.objects.clone(),
            self.config.clone(),
            fault,
            path.to_string(),
            bytes,
            content_type.to_string(),
            reporter,
        ));

        Ok(handle)
    }

    async fn download_url(&self, path: &str) -> UploadResult<String> {
        if let Some(Fault::Resolution { reason }) = self.faults.read().get(path) {
            return Err(UploadError::resolution(path, reason.clone()));
        }
        if !self.contains(path) {
            return Err(UploadError::resolution(path, "object not found"));
        }
        Ok(format!("{}/{}", self.config.base_url.trim_end_matches('/'), path))
    }
}
