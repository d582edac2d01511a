use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identifier assigned to a file once, when its batch is planned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    /// Generate a new random (UUID v4) file ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A local, in-memory file picked by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl FileHandle {
    pub fn new<N, M, B>(name: N, mime_type: M, bytes: B) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        B: Into<Bytes>,
    {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size of the content in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared content type, falling back to `application/octet-stream`
    pub fn content_type(&self) -> &str {
        if self.mime_type.is_empty() {
            "application/octet-stream"
        } else {
            &self.mime_type
        }
    }
}

/// Per-file state inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: FileId,
    pub file: Arc<FileHandle>,
    pub storage_path: String,
    /// Empty until the transfer has completed
    pub download_url: String,
    /// Percentage in `0..=100`
    pub progress: u8,
}

impl UploadRecord {
    /// Record for a file whose transfer has not started yet
    pub fn pending(id: FileId, file: Arc<FileHandle>, storage_path: String) -> Self {
        Self {
            id,
            file,
            storage_path,
            download_url: String::new(),
            progress: 0,
        }
    }

    /// Copy of this record at a new progress value
    pub fn with_progress(&self, progress: u8) -> Self {
        Self {
            progress: progress.min(100),
            ..self.clone()
        }
    }

    /// Copy of this record marked as fully uploaded
    pub fn completed(&self, download_url: String) -> Self {
        Self {
            download_url,
            progress: 100,
            ..self.clone()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.download_url.is_empty()
    }
}
