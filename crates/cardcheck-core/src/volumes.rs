use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A mounted removable volume, as (label, root) pairs read from the mount
/// directory. Which volume plays which role is decided by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub label: String,
    pub root: PathBuf,
}

/// List mounted volumes under `volumes_dir`, skipping hidden entries and the
/// labels in `ignore_labels` (the internal disk). Sorted by label so the
/// selection prompt is stable across runs.
pub fn list_volumes(volumes_dir: &Path, ignore_labels: &[String]) -> io::Result<Vec<Volume>> {
    let mut volumes = Vec::new();

    for entry in fs::read_dir(volumes_dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let label = entry.file_name().to_string_lossy().into_owned();
        if label.starts_with('.') || ignore_labels.iter().any(|ignored| ignored == &label) {
            continue;
        }
        volumes.push(Volume {
            label,
            root: entry.path(),
        });
    }

    volumes.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(volumes)
}
