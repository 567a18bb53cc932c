//! Progress hooks shared by the harvest and organize pipelines.

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a discipline page is processed.
    fn discipline_started(&self, name: &str, current: usize, total: usize);
    /// Called after a document was written to disk.
    fn document_saved(&self, path: &str);
    /// Called after a text file was placed in the taxonomy tree.
    fn file_organized(&self, path: &str, current: usize);
    /// Called when the pipeline completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn discipline_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn document_saved(&self, _path: &str) {}
    fn file_organized(&self, _path: &str, _current: usize) {}
    fn done(&self) {}
}
