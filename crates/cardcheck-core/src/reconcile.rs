use crate::error::Error;
use crate::fingerprint;
use crate::index::{FileRecord, MediaKind, VolumeIndex};
use crate::progress::ProgressReporter;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::warn;

/// Final classification of one source file against the backup set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Identity matched a backup file and the full-content hashes agree.
    Verified,
    /// No backup holds this identity (or the matched copy vanished mid-check).
    Missing,
    /// A backup holds this identity but its full-content hash disagrees.
    Corrupted,
}

/// Result of reconciling one source index against the union of all backups.
/// `missing` and `corrupted` are disjoint by construction; every source
/// record lands in exactly one of missing, corrupted, or the verified count.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub missing: Vec<FileRecord>,
    pub corrupted: Vec<FileRecord>,
    pub verified_count: usize,
}

/// Compare every source file against the merged backup inventory.
///
/// Identity match alone never clears a file: the full-content hashes of both
/// sides must agree before it counts as verified. Hash comparisons run in
/// parallel; the source ordering (videos then images, each sorted by
/// identity) is preserved so the result is deterministic for a given input.
pub fn reconcile(
    source: &VolumeIndex,
    backups: &[VolumeIndex],
    reporter: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<ReconcileOutcome, Error> {
    let backup_videos = merge_backup_maps(backups, MediaKind::Video);
    let backup_images = merge_backup_maps(backups, MediaKind::Image);

    let mut candidates: Vec<(&FileRecord, Option<&FileRecord>)> = Vec::new();
    for (records, merged) in [
        (&source.videos_by_identity, &backup_videos),
        (&source.images_by_identity, &backup_images),
    ] {
        let mut sorted: Vec<&FileRecord> = records.values().collect();
        sorted.sort_by(|a, b| a.identity.cmp(&b.identity));
        for record in sorted {
            candidates.push((record, merged.get(record.identity.as_str()).copied()));
        }
    }

    let total = candidates.len();
    reporter.on_verify_start(total);
    let done = AtomicUsize::new(0);

    let statuses: Vec<FileStatus> = candidates
        .par_iter()
        .map(|(record, matched)| {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let status = classify(record, *matched);
            reporter.on_file_status(record, status);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.on_verify_progress(finished, total);
            Ok(status)
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut missing = Vec::new();
    let mut corrupted = Vec::new();
    let mut verified_count = 0usize;
    for ((record, _), status) in candidates.iter().zip(&statuses) {
        match status {
            FileStatus::Verified => verified_count += 1,
            FileStatus::Missing => missing.push((*record).clone()),
            FileStatus::Corrupted => corrupted.push((*record).clone()),
        }
    }

    Ok(ReconcileOutcome {
        missing,
        corrupted,
        verified_count,
    })
}

/// Union of one media kind across every backup index. Presence in any single
/// backup is sufficient; which backup wins an identity collision is not
/// significant.
fn merge_backup_maps(backups: &[VolumeIndex], kind: MediaKind) -> HashMap<&str, &FileRecord> {
    let mut merged: HashMap<&str, &FileRecord> = HashMap::new();
    for backup in backups {
        let records = match kind {
            MediaKind::Video => &backup.videos_by_identity,
            MediaKind::Image => &backup.images_by_identity,
        };
        for (identity, record) in records {
            merged.insert(identity.as_str(), record);
        }
    }
    merged
}

fn classify(record: &FileRecord, matched: Option<&FileRecord>) -> FileStatus {
    let Some(backup) = matched else {
        return FileStatus::Missing;
    };

    // A file vanishing between indexing and this comparison degrades to
    // missing rather than aborting the run.
    let source_hash = match fingerprint::full_hash(&record.location) {
        Ok(hash) => hash,
        Err(err) => {
            warn!(
                "Could not read source file {} during verification: {}",
                record.location.display(),
                err
            );
            return FileStatus::Missing;
        }
    };
    let backup_hash = match fingerprint::full_hash(&backup.location) {
        Ok(hash) => hash,
        Err(err) => {
            warn!(
                "Could not read backup file {} during verification: {}",
                backup.location.display(),
                err
            );
            return FileStatus::Missing;
        }
    };

    if source_hash == backup_hash {
        FileStatus::Verified
    } else {
        FileStatus::Corrupted
    }
}
