#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use dog_upload::{
    CallbackObserver, FileHandle, StorageCapability, UploadBatch, UploadError, UploadHandle,
    UploadResult,
};

/// How a scripted transfer ends
#[derive(Debug, Clone)]
pub enum Outcome {
    Complete,
    Fail(String),
}

/// Progress events `(bytes_transferred, total_bytes)` a path reports, then its outcome
#[derive(Debug, Clone)]
pub struct Script {
    pub events: Vec<(u64, u64)>,
    pub outcome: Outcome,
}

impl Script {
    pub fn completing(events: Vec<(u64, u64)>) -> Self {
        Self { events, outcome: Outcome::Complete }
    }

    pub fn failing(events: Vec<(u64, u64)>, reason: &str) -> Self {
        Self { events, outcome: Outcome::Fail(reason.to_string()) }
    }
}

/// Storage that replays a fixed script per path, yielding between events so
/// concurrent transfers interleave
#[derive(Default)]
pub struct ScriptedStorage {
    scripts: Mutex<HashMap<String, Script>>,
}

impl ScriptedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script<P: Into<String>>(self, path: P, script: Script) -> Self {
        self.scripts.lock().insert(path.into(), script);
        self
    }
}

#[async_trait]
impl StorageCapability for ScriptedStorage {
    async fn begin_upload(&self, path: &str, bytes: Bytes, _content_type: &str) -> UploadResult<UploadHandle> {
        let total = bytes.len() as u64;
        let script = self
            .scripts
            .lock()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Script::completing(vec![(total, total)]));

        let (reporter, handle) = UploadHandle::channel();
        tokio::spawn(async move {
            for (sent, total) in script.events {
                tokio::task::yield_now().await;
                reporter.progress(sent, total);
            }
            tokio::task::yield_now().await;
            match script.outcome {
                Outcome::Complete => reporter.complete(),
                Outcome::Fail(reason) => reporter.fail(reason),
            }
        });
        Ok(handle)
    }

    async fn download_url(&self, path: &str) -> UploadResult<String> {
        if path.is_empty() {
            return Err(UploadError::resolution(path, "empty path"));
        }
        Ok(format!("https://files.test/{}", path))
    }
}

/// Everything an observer saw during one batch
#[derive(Default)]
pub struct Recorded {
    pub selected: Mutex<Vec<UploadBatch>>,
    pub starting: AtomicUsize,
    pub updates: Mutex<Vec<UploadBatch>>,
    pub succeeded: Mutex<Vec<UploadBatch>>,
    /// Signal names in the order they arrived
    pub order: Mutex<Vec<&'static str>>,
}

impl Recorded {
    pub fn starting_count(&self) -> usize {
        self.starting.load(Ordering::SeqCst)
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.lock().len()
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.order.lock().clone()
    }
}

/// Observer that records every signal into the returned [`Recorded`]
pub fn recording_observer() -> (CallbackObserver, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());

    let observer = CallbackObserver::new()
        .on_files_selected({
            let recorded = recorded.clone();
            move |batch: &UploadBatch| {
                recorded.order.lock().push("selected");
                recorded.selected.lock().push(batch.clone());
            }
        })
        .on_starting({
            let recorded = recorded.clone();
            move || {
                recorded.order.lock().push("starting");
                recorded.starting.fetch_add(1, Ordering::SeqCst);
            }
        })
        .on_updated({
            let recorded = recorded.clone();
            move |batch: &UploadBatch| {
                recorded.order.lock().push("updated");
                recorded.updates.lock().push(batch.clone());
            }
        })
        .on_succeeded({
            let recorded = recorded.clone();
            move |batch: UploadBatch| {
                recorded.order.lock().push("succeeded");
                recorded.succeeded.lock().push(batch);
            }
        });

    (observer, recorded)
}

pub fn file(name: &str, size: usize) -> FileHandle {
    FileHandle::new(name, "application/octet-stream", vec![0u8; size])
}

pub fn files(names: &[&str], size: usize) -> Vec<FileHandle> {
    names.iter().map(|name| file(name, size)).collect()
}
