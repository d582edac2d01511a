use serde::{Deserialize, Serialize};

use crate::UploadResult;

/// Configuration for a batch upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploaderConfig {
    /// Destination prefix; every storage path is `<folder_name>/<file name>`
    pub folder_name: String,

    /// File-type filter for the picker. Passed through, never enforced here.
    pub accept: String,

    /// Use the generated id as the object name instead of the original file name
    pub random_name: bool,

    /// Whether the picker may select more than one file
    pub multiple: bool,

    /// Presentation flag for the picker
    pub hidden: bool,

    /// Upper bound on simultaneous transfers. `None` uploads every file at once.
    pub max_concurrency: Option<usize>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            folder_name: "uploads".to_string(),
            accept: "*/*".to_string(),
            random_name: false,
            multiple: true,
            hidden: false,
            max_concurrency: None,
        }
    }
}

impl UploaderConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> UploadResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the destination folder
    pub fn with_folder_name<S: Into<String>>(mut self, folder_name: S) -> Self {
        self.folder_name = folder_name.into();
        self
    }

    /// Set the picker's accept filter
    pub fn with_accept<S: Into<String>>(mut self, accept: S) -> Self {
        self.accept = accept.into();
        self
    }

    /// Name uploaded objects after their generated id
    pub fn with_random_name(mut self) -> Self {
        self.random_name = true;
        self
    }

    /// Restrict the picker to a single file
    pub fn single_file(mut self) -> Self {
        self.multiple = false;
        self
    }

    /// Hide the picker element
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Cap the number of simultaneous transfers
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }

    /// Effective fan-out for a batch of `file_count` files
    pub(crate) fn fan_out(&self, file_count: usize) -> usize {
        match self.max_concurrency {
            Some(limit) => limit.clamp(1, file_count.max(1)),
            None => file_count.max(1),
        }
    }
}

/// Configuration for the in-memory storage backend
#[derive(Debug, Clone)]
pub struct MemoryStorageConfig {
    /// Bytes reported per progress event
    pub chunk_size: usize,

    /// Prefix for resolved download URLs
    pub base_url: String,

    /// Pause between chunks, to let transfers interleave visibly
    pub chunk_delay: Option<std::time::Duration>,
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024, // 64KB
            base_url: "memory://bucket".to_string(),
            chunk_delay: None,
        }
    }
}

impl MemoryStorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_chunk_delay(mut self, delay: std::time::Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }
}
