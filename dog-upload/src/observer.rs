use crate::UploadBatch;

/// Caller-facing lifecycle signals of a batch upload
pub trait UploadObserver: Send + Sync {
    /// Called with the planned selection (every record at 0%) before any transfer starts
    fn on_files_selected(&self, _selection: &UploadBatch) {}

    /// Called exactly once, before any I/O
    fn on_batch_starting(&self);

    /// Called with every new snapshot while transfers are running
    fn on_batch_updated(&self, _batch: &UploadBatch) {}

    /// Called exactly once when every file uploaded; never called if one failed
    fn on_batch_succeeded(&self, batch: UploadBatch);
}

/// Observer that ignores every signal
#[derive(Debug, Clone, Default)]
pub struct NoopObserver;

impl UploadObserver for NoopObserver {
    fn on_batch_starting(&self) {}

    fn on_batch_succeeded(&self, _batch: UploadBatch) {}
}

type BatchCallback = Box<dyn Fn(&UploadBatch) + Send + Sync>;

/// Observer assembled from closures; unset signals are ignored
#[derive(Default)]
pub struct CallbackObserver {
    files_selected: Option<BatchCallback>,
    starting: Option<Box<dyn Fn() + Send + Sync>>,
    updated: Option<BatchCallback>,
    succeeded: Option<Box<dyn Fn(UploadBatch) + Send + Sync>>,
}

impl CallbackObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_files_selected<F>(mut self, f: F) -> Self
    where
        F: Fn(&UploadBatch) + Send + Sync + 'static,
    {
        self.files_selected = Some(Box::new(f));
        self
    }

    pub fn on_starting<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.starting = Some(Box::new(f));
        self
    }

    pub fn on_updated<F>(mut self, f: F) -> Self
    where
        F: Fn(&UploadBatch) + Send + Sync + 'static,
    {
        self.updated = Some(Box::new(f));
        self
    }

    pub fn on_succeeded<F>(mut self, f: F) -> Self
    where
        F: Fn(UploadBatch) + Send + Sync + 'static,
    {
        self.succeeded = Some(Box::new(f));
        self
    }
}

impl UploadObserver for CallbackObserver {
    fn on_files_selected(&self, selection: &UploadBatch) {
        if let Some(f) = &self.files_selected {
            f(selection);
        }
    }

    fn on_batch_starting(&self) {
        if let Some(f) = &self.starting {
            f();
        }
    }

    fn on_batch_updated(&self, batch: &UploadBatch) {
        if let Some(f) = &self.updated {
            f(batch);
        }
    }

    fn on_batch_succeeded(&self, batch: UploadBatch) {
        if let Some(f) = &self.succeeded {
            f(batch);
        }
    }
}
