use std::collections::HashSet;
use std::sync::Arc;

use crate::{FileHandle, FileId, UploadError, UploadResult, UploaderConfig};

/// Source of per-file identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> FileId;
}

/// Default generator: random UUID v4
#[derive(Debug, Clone, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> FileId {
        FileId::new()
    }
}

/// Object name for a file: the generated id when random naming is on, else the file's own name
pub fn resolve_file_name(file: &FileHandle, random_name: bool, generated_id: &FileId) -> String {
    if random_name {
        generated_id.to_string()
    } else {
        file.name.clone()
    }
}

/// `<folder>/<name>` with a single separator between them
pub fn resolve_storage_path(folder_name: &str, resolved_name: &str) -> String {
    format!("{}/{}", folder_name, resolved_name)
}

/// Identity and destination of one file, fixed before any transfer starts
#[derive(Debug, Clone)]
pub struct PlannedUpload {
    pub id: FileId,
    pub file: Arc<FileHandle>,
    pub storage_path: String,
}

/// Assign every file its id and storage path.
///
/// Fails on an empty folder name, which would produce `/<name>` paths, and
/// on an id generator that repeats itself within the batch.
pub fn plan_uploads(
    files: Vec<FileHandle>,
    config: &UploaderConfig,
    ids: &dyn IdGenerator,
) -> UploadResult<Vec<PlannedUpload>> {
    if config.folder_name.is_empty() {
        return Err(UploadError::invalid("folder name must not be empty"));
    }

    let mut seen = HashSet::with_capacity(files.len());
    let mut planned = Vec::with_capacity(files.len());
    for file in files {
        let id = ids.generate();
        if !seen.insert(id.clone()) {
            return Err(UploadError::invalid(format!("duplicate file id generated: {}", id)));
        }
        let name = resolve_file_name(&file, config.random_name, &id);
        planned.push(PlannedUpload {
            storage_path: resolve_storage_path(&config.folder_name, &name),
            id,
            file: Arc::new(file),
        });
    }
    Ok(planned)
}
