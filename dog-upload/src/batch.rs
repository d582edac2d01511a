use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{FileId, UploadRecord};

/// All records of one batch, keyed by file id.
///
/// Values are never edited in place: each change produces a new batch with
/// exactly one entry added or replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadBatch {
    records: HashMap<FileId, UploadRecord>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// New batch equal to this one with `record` added or replaced by id
    pub fn with_record(&self, record: UploadRecord) -> Self {
        let mut records = self.records.clone();
        records.insert(record.id.clone(), record);
        Self { records }
    }

    pub fn get(&self, id: &FileId) -> Option<&UploadRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &FileId> {
        self.records.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &UploadRecord> {
        self.records.values()
    }

    /// True when every record has its download URL
    pub fn is_complete(&self) -> bool {
        self.records.values().all(UploadRecord::is_complete)
    }
}

impl FromIterator<UploadRecord> for UploadBatch {
    fn from_iter<I: IntoIterator<Item = UploadRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }
}

/// Change to one file's record, sent by its upload task
#[derive(Debug, Clone)]
pub enum BatchUpdate {
    Inserted(UploadRecord),
    Progress { id: FileId, progress: u8 },
    Completed { id: FileId, download_url: String },
    Failed { id: FileId, reason: String },
}

impl BatchUpdate {
    pub fn id(&self) -> &FileId {
        match self {
            Self::Inserted(record) => &record.id,
            Self::Progress { id, .. } => id,
            Self::Completed { id, .. } => id,
            Self::Failed { id, .. } => id,
        }
    }
}

/// Single-writer table holding the latest whole-batch snapshot
#[derive(Debug, Default)]
pub struct BatchTable {
    current: Arc<UploadBatch>,
}

impl BatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<UploadBatch> {
        self.current.clone()
    }

    /// Apply one update. Returns the new snapshot, or `None` when nothing changed.
    ///
    /// Updates for ids that were never inserted are ignored, and so are
    /// progress updates after completion. Failures leave the last committed record as is.
    pub fn apply(&mut self, update: BatchUpdate) -> Option<Arc<UploadBatch>> {
        let next = match update {
            BatchUpdate::Inserted(record) => self.current.with_record(record),
            BatchUpdate::Progress { id, progress } => {
                let record = self.current.get(&id)?;
                if record.is_complete() {
                    return None;
                }
                self.current.with_record(record.with_progress(progress))
            }
            BatchUpdate::Completed { id, download_url } => {
                let record = self.current.get(&id)?;
                self.current.with_record(record.completed(download_url))
            }
            BatchUpdate::Failed { .. } => return None,
        };

        self.current = Arc::new(next);
        Some(self.current.clone())
    }

    /// Take the final batch out of the table
    pub fn into_batch(self) -> UploadBatch {
        Arc::try_unwrap(self.current).unwrap_or_else(|shared| (*shared).clone())
    }
}
