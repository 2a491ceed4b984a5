use crate::index::FileRecord;
use crate::reconcile::FileStatus;

/// Trait for reporting check progress.
///
/// The CLI implements this with indicatif bars; tests use `SilentReporter`.
/// Purely advisory — the engine's results never depend on it. All methods
/// have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_index_start(&self, _volume: &str) {}
    fn on_index_progress(&self, _volume: &str, _files_indexed: usize, _bytes_indexed: u64) {}
    fn on_index_complete(&self, _volume: &str, _total_files: usize, _duration_secs: f64) {}
    fn on_verify_start(&self, _total_files: usize) {}
    fn on_file_status(&self, _record: &FileRecord, _status: FileStatus) {}
    fn on_verify_progress(&self, _files_verified: usize, _total_files: usize) {}
    fn on_verify_complete(
        &self,
        _verified: usize,
        _missing: usize,
        _corrupted: usize,
        _duration_secs: f64,
    ) {
    }
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
