use crate::config::AppConfig;
use crate::error::Error;
use crate::index::{self, FileRecord, UnreadableFile, VolumeIndex};
use crate::progress::ProgressReporter;
use crate::reconcile;
use crate::volumes::Volume;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct CheckEngine {
    config: AppConfig,
    cancel: Arc<AtomicBool>,
}

/// Outcome of one full check run. Indexes are discarded once this is built;
/// nothing persists between runs.
#[derive(Debug)]
pub struct CheckReport {
    pub source_label: String,
    pub files_checked: usize,
    pub bytes_checked: u64,
    pub verified: usize,
    pub missing: Vec<FileRecord>,
    pub corrupted: Vec<FileRecord>,
    pub unreadable: Vec<UnreadableFile>,
    pub index_duration: Duration,
    pub verify_duration: Duration,
}

impl CheckReport {
    /// True when every source file was confirmed byte-identical on some
    /// backup. Unreadable source files count against cleanliness: a file we
    /// could not fingerprint is a file we could not verify.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.corrupted.is_empty() && self.unreadable.is_empty()
    }
}

impl CheckEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative cancellation token. Store `true` from another thread to
    /// stop a running check; `check()` resets it at start.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the full verification pipeline:
    /// 1. Index the source card
    /// 2. Index every backup volume in parallel (any failure fails the check)
    /// 3. Reconcile: identity match, then full-content hash confirmation
    pub fn check(
        &self,
        source: &Volume,
        backups: &[Volume],
        reporter: &dyn ProgressReporter,
    ) -> Result<CheckReport, Error> {
        if backups.is_empty() {
            return Err(Error::NoBackupVolumes);
        }
        self.config.validate()?;
        self.cancel.store(false, Ordering::Relaxed);

        info!(
            "Checking '{}' against {} backup volume(s)",
            source.label,
            backups.len()
        );

        let index_start = Instant::now();
        let source_index = index::index_volume(
            &source.root,
            &source.label,
            &self.config,
            reporter,
            &self.cancel,
        )?;

        // Each backup walk is independent and writes only its own index, so
        // they run concurrently. One failed walk fails the whole check — an
        // unindexed backup could hide a real data-loss condition.
        let backup_indexes: Vec<VolumeIndex> = backups
            .par_iter()
            .map(|volume| {
                index::index_volume(
                    &volume.root,
                    &volume.label,
                    &self.config,
                    reporter,
                    &self.cancel,
                )
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let index_duration = index_start.elapsed();

        for backup in &backup_indexes {
            if !backup.unreadable.is_empty() {
                warn!(
                    "{} unreadable file(s) on backup '{}' were skipped; matching source files will read as missing",
                    backup.unreadable.len(),
                    backup.volume_label,
                );
            }
        }

        let verify_start = Instant::now();
        let outcome =
            reconcile::reconcile(&source_index, &backup_indexes, reporter, &self.cancel)?;
        let verify_duration = verify_start.elapsed();
        reporter.on_verify_complete(
            outcome.verified_count,
            outcome.missing.len(),
            outcome.corrupted.len(),
            verify_duration.as_secs_f64(),
        );

        debug!(
            "Index completed in {:.2}s, verify completed in {:.2}s — {} verified, {} missing, {} corrupted",
            index_duration.as_secs_f64(),
            verify_duration.as_secs_f64(),
            outcome.verified_count,
            outcome.missing.len(),
            outcome.corrupted.len(),
        );

        Ok(CheckReport {
            source_label: source_index.volume_label.clone(),
            files_checked: source_index.media_file_count(),
            bytes_checked: source_index.total_bytes(),
            verified: outcome.verified_count,
            missing: outcome.missing,
            corrupted: outcome.corrupted,
            unreadable: source_index.unreadable,
            index_duration,
            verify_duration,
        })
    }
}
