use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::FileId;

/// Lifecycle events of a batch, broadcast for observability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Uploads are about to start
    Started {
        file_count: usize,
        at: DateTime<Utc>,
    },

    /// One file finished transferring and has a download URL
    FileCompleted {
        file_id: FileId,
        download_url: String,
        at: DateTime<Utc>,
    },

    /// One file's transfer failed
    FileFailed {
        file_id: FileId,
        reason: String,
        at: DateTime<Utc>,
    },

    /// Every file uploaded
    Succeeded {
        file_count: usize,
        at: DateTime<Utc>,
    },

    /// At least one file failed; no success batch is produced
    Failed {
        failed_count: usize,
        error: String,
        at: DateTime<Utc>,
    },
}

impl BatchEvent {
    /// Get event type name as string
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::FileCompleted { .. } => "file_completed",
            Self::FileFailed { .. } => "file_failed",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    /// Get the timestamp from any event
    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::Started { at, .. } => at,
            Self::FileCompleted { at, .. } => at,
            Self::FileFailed { at, .. } => at,
            Self::Succeeded { at, .. } => at,
            Self::Failed { at, .. } => at,
        }
    }

    /// File the event is about, if it concerns a single file
    pub fn file_id(&self) -> Option<&FileId> {
        match self {
            Self::FileCompleted { file_id, .. } | Self::FileFailed { file_id, .. } => Some(file_id),
            _ => None,
        }
    }

    /// Whether this event ends the batch
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let id = FileId::new();
        let event = BatchEvent::FileFailed {
            file_id: id.clone(),
            reason: "network".to_string(),
            at: Utc::now(),
        };

        assert_eq!(event.event_name(), "file_failed");
        assert_eq!(event.file_id(), Some(&id));
        assert!(!event.is_terminal());
        assert!(BatchEvent::Succeeded { file_count: 1, at: Utc::now() }.is_terminal());
    }
}
