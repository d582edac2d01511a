use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur while uploading a batch
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Transfer to {path} failed: {reason}")]
    Transfer { path: String, reason: String },

    #[error("Could not resolve download URL for {path}: {reason}")]
    Resolution { path: String, reason: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl UploadError {
    /// Create a transfer error for the object at `path`
    pub fn transfer<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::Transfer {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a download URL resolution error
    pub fn resolution<P: Into<String>, R: Into<String>>(path: P, reason: R) -> Self {
        Self::Resolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
