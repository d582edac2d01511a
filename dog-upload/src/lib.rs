//! # dog-upload: Concurrent batch uploads with live progress
//!
//! `dog-upload` takes a set of user-selected files, uploads each one
//! concurrently to a blob-storage backend, keeps a consistent per-file
//! snapshot of progress while transfers run, and reports one aggregated
//! result once every transfer has settled.
//!
//! ## Key Features
//!
//! - **Stable identity**: every file gets a UUID and a storage path before any I/O
//! - **Consistent snapshots**: each update produces a new batch value, readers never see half-applied state
//! - **All-or-nothing**: one failed file fails the batch, the success signal never fires
//! - **Storage agnostic**: any backend implementing [`StorageCapability`] works; [`MemoryStorage`] ships for tests
//! - **Bounded or unbounded fan-out**: cap simultaneous transfers with `max_concurrency`
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_upload::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> UploadResult<()> {
//! let config = UploaderConfig::new().with_folder_name("avatars");
//! let observer = CallbackObserver::new()
//!     .on_starting(|| println!("uploading..."))
//!     .on_succeeded(|batch| println!("{} files uploaded", batch.len()));
//!
//! let uploader = BatchUploader::new(MemoryStorage::new(), config).with_observer(observer);
//!
//! let files = vec![FileHandle::new("me.png", "image/png", vec![0u8; 1024])];
//! let batch = uploader.upload_files(files).await?;
//!
//! for record in batch.records() {
//!     println!("{} -> {}", record.storage_path, record.download_url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Your picker/UI  │  ← hands over FileHandles, receives signals
//! ├──────────────────┤
//! │  BatchUploader   │  ← plans ids/paths, fans out, owns the batch table
//! ├──────────────────┤
//! │  upload_file     │  ← one per file, sends BatchUpdates over a channel
//! ├──────────────────┤
//! │ StorageCapability│  ← begin_upload / download_url
//! └──────────────────┘
//! ```

mod batch;
mod config;
mod coordinator;
mod error;
mod events;
mod memory;
pub mod naming;
mod observer;
pub mod store;
mod types;
pub mod upload;

// Re-export main types for clean API
pub use batch::{BatchTable, BatchUpdate, UploadBatch};
pub use config::{MemoryStorageConfig, UploaderConfig};
pub use coordinator::BatchUploader;
pub use error::{UploadError, UploadResult};
pub use events::BatchEvent;
pub use memory::{MemoryStorage, StoredObject};
pub use naming::{
    plan_uploads, resolve_file_name, resolve_storage_path, IdGenerator, PlannedUpload,
    UuidGenerator,
};
pub use observer::{CallbackObserver, NoopObserver, UploadObserver};
pub use store::{StorageCapability, TransferEvent, TransferProgress, TransferReporter, UploadHandle};
pub use types::{FileHandle, FileId, UploadRecord};

/// Install a global `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns false if a subscriber was already installed.
#[cfg(feature = "tracing-basic")]
pub fn init_tracing() -> bool {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BatchUploader, CallbackObserver, FileHandle, FileId, MemoryStorage, StorageCapability,
        UploadBatch, UploadError, UploadObserver, UploadRecord, UploadResult, UploaderConfig,
    };
}
