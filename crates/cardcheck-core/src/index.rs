use crate::config::AppConfig;
use crate::error::Error;
use crate::fingerprint;
use crate::progress::ProgressReporter;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// One discovered media file. `identity` is derived purely from file content
/// and sampling parameters; `display_name` and `location` exist for reporting
/// only and are never used as matching keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub identity: String,
    pub display_name: String,
    pub location: PathBuf,
    pub size_bytes: u64,
    pub media_kind: MediaKind,
    pub volume_label: String,
}

/// A media file that could not be read during indexing. Skipped rather than
/// aborting the walk, but surfaced so a check never silently passes over it.
#[derive(Debug, Clone)]
pub struct UnreadableFile {
    pub location: PathBuf,
    pub reason: String,
}

/// Full media inventory of one mounted volume at one point in time. Built by
/// a single walk, never updated afterwards, never persisted.
#[derive(Debug)]
pub struct VolumeIndex {
    pub videos_by_identity: HashMap<String, FileRecord>,
    pub images_by_identity: HashMap<String, FileRecord>,
    pub unreadable: Vec<UnreadableFile>,
    pub volume_label: String,
    pub volume_root: PathBuf,
}

impl VolumeIndex {
    pub fn media_file_count(&self) -> usize {
        self.videos_by_identity.len() + self.images_by_identity.len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.videos_by_identity
            .values()
            .chain(self.images_by_identity.values())
            .map(|record| record.size_bytes)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.videos_by_identity.is_empty() && self.images_by_identity.is_empty()
    }
}

struct WalkContext<'a> {
    label: &'a str,
    config: &'a AppConfig,
    reporter: &'a dyn ProgressReporter,
    cancel: &'a AtomicBool,
    videos: DashMap<String, FileRecord>,
    images: DashMap<String, FileRecord>,
    unreadable: DashMap<PathBuf, String>,
    files_indexed: AtomicUsize,
    bytes_indexed: AtomicU64,
}

/// Parallel recursive walk of one volume. Hidden directories and the
/// configured denylist are pruned entirely; hidden files are skipped; files
/// are classified by case-insensitive extension and fingerprinted into maps
/// keyed on content identity. Two same-volume files with the same identity
/// collapse to one entry, last writer wins — an accepted risk given the
/// collision odds, not a detected error.
///
/// Per-file read failures are skipped and recorded as unreadable. A failure
/// to read a directory aborts the whole volume walk, since an unwalked
/// subtree on a backup could hide real data loss.
pub fn index_volume(
    root: &Path,
    label: &str,
    config: &AppConfig,
    reporter: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<VolumeIndex, Error> {
    let start = Instant::now();
    reporter.on_index_start(label);

    let ctx = WalkContext {
        label,
        config,
        reporter,
        cancel,
        videos: DashMap::new(),
        images: DashMap::new(),
        unreadable: DashMap::new(),
        files_indexed: AtomicUsize::new(0),
        bytes_indexed: AtomicU64::new(0),
    };

    visit_dirs(root, &ctx)?;

    let mut unreadable: Vec<UnreadableFile> = ctx
        .unreadable
        .into_iter()
        .map(|(location, reason)| UnreadableFile { location, reason })
        .collect();
    unreadable.sort_by(|a, b| a.location.cmp(&b.location));

    let index = VolumeIndex {
        videos_by_identity: ctx.videos.into_iter().collect(),
        images_by_identity: ctx.images.into_iter().collect(),
        unreadable,
        volume_label: label.to_string(),
        volume_root: root.to_path_buf(),
    };

    let duration = start.elapsed();
    reporter.on_index_complete(label, index.media_file_count(), duration.as_secs_f64());
    debug!(
        "Indexed volume '{}' in {:.2}s — {} media files, {} bytes, {} unreadable",
        label,
        duration.as_secs_f64(),
        index.media_file_count(),
        index.total_bytes(),
        index.unreadable.len(),
    );

    Ok(index)
}

fn visit_dirs(dir: &Path, ctx: &WalkContext) -> Result<(), Error> {
    if ctx.cancel.load(Ordering::Relaxed) {
        return Err(Error::Cancelled);
    }

    let entries = fs::read_dir(dir).map_err(|err| {
        Error::Io(io::Error::new(
            err.kind(),
            format!("Error reading directory {}: {}", dir.display(), err),
        ))
    })?;

    entries.par_bridge().try_for_each(|entry_result| {
        let entry = entry_result.map_err(|err| {
            Error::Io(io::Error::new(
                err.kind(),
                format!("Error reading entry in {}: {}", dir.display(), err),
            ))
        })?;

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        let file_type = entry.file_type().map_err(Error::Io)?;
        if file_type.is_symlink() {
            return Ok(());
        }

        if file_type.is_dir() {
            if name.starts_with('.') || ctx.config.ignore_dirs.iter().any(|d| d == &name) {
                return Ok(());
            }
            return visit_dirs(&path, ctx);
        }

        if name.starts_with('.') {
            return Ok(());
        }

        let Some(kind) = classify_extension(&path, ctx.config) else {
            return Ok(());
        };

        process_media_file(&path, name, kind, ctx);
        Ok(())
    })
}

fn process_media_file(path: &Path, name: String, kind: MediaKind, ctx: &WalkContext) {
    let result = fs::metadata(path).and_then(|metadata| {
        let identity = fingerprint::fingerprint(
            path,
            ctx.config.sample_chunk_bytes,
            ctx.config.sample_regions,
        )?;
        Ok((metadata.len(), identity))
    });

    let (size_bytes, identity) = match result {
        Ok(ok) => ok,
        Err(err) => {
            warn!("Skipping unreadable file {}: {}", path.display(), err);
            ctx.unreadable.insert(path.to_path_buf(), err.to_string());
            return;
        }
    };

    let record = FileRecord {
        identity: identity.clone(),
        display_name: name,
        location: path.to_path_buf(),
        size_bytes,
        media_kind: kind,
        volume_label: ctx.label.to_string(),
    };

    match kind {
        MediaKind::Video => ctx.videos.insert(identity, record),
        MediaKind::Image => ctx.images.insert(identity, record),
    };

    let files = ctx.files_indexed.fetch_add(1, Ordering::Relaxed) + 1;
    let bytes = ctx.bytes_indexed.fetch_add(size_bytes, Ordering::Relaxed) + size_bytes;
    ctx.reporter.on_index_progress(ctx.label, files, bytes);
}

fn classify_extension(path: &Path, config: &AppConfig) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?;
    if config
        .image_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
    {
        Some(MediaKind::Image)
    } else if config
        .video_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
    {
        Some(MediaKind::Video)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentReporter;
    use std::fs;
    use tempfile::tempdir;

    fn build_index(root: &Path) -> VolumeIndex {
        let config = AppConfig::default();
        let cancel = AtomicBool::new(false);
        index_volume(root, "TestVol", &config, &SilentReporter, &cancel).unwrap()
    }

    #[test]
    fn test_classify_extension_is_case_insensitive() {
        let config = AppConfig::default();
        assert_eq!(
            classify_extension(Path::new("a/C0001.MP4"), &config),
            Some(MediaKind::Video)
        );
        assert_eq!(
            classify_extension(Path::new("a/IMG_1.JpG"), &config),
            Some(MediaKind::Image)
        );
        assert_eq!(classify_extension(Path::new("a/notes.txt"), &config), None);
        assert_eq!(classify_extension(Path::new("a/no_extension"), &config), None);
    }

    #[test]
    fn test_hidden_and_denylisted_entries_are_pruned() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        fs::create_dir(root.join(".Trashes")).unwrap();
        fs::write(root.join(".Trashes/buried.jpg"), b"hidden dir content").unwrap();
        fs::create_dir(root.join("THMBNL")).unwrap();
        fs::write(root.join("THMBNL/thumb.jpg"), b"thumbnail cache").unwrap();
        fs::write(root.join("._IMG_0001.jpg"), b"metadata sidecar").unwrap();
        fs::write(root.join("notes.txt"), b"not media").unwrap();
        fs::write(root.join("IMG_0001.jpg"), b"real image").unwrap();

        let index = build_index(root);
        assert_eq!(index.images_by_identity.len(), 1);
        assert!(index.videos_by_identity.is_empty());
        let record = index.images_by_identity.values().next().unwrap();
        assert_eq!(record.display_name, "IMG_0001.jpg");
    }

    #[test]
    fn test_kinds_are_classified_into_separate_maps() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("clip.mp4"), b"video bytes").unwrap();
        fs::write(tmp.path().join("photo.jpg"), b"image bytes").unwrap();

        let index = build_index(tmp.path());
        assert_eq!(index.videos_by_identity.len(), 1);
        assert_eq!(index.images_by_identity.len(), 1);
        assert_eq!(index.media_file_count(), 2);
        assert_eq!(
            index.total_bytes(),
            b"video bytes".len() as u64 + b"image bytes".len() as u64
        );
    }

    #[test]
    fn test_same_volume_identity_collision_keeps_one_entry() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"same bytes").unwrap();
        fs::write(tmp.path().join("b.jpg"), b"same bytes").unwrap();

        // Byte-identical files share an identity; last writer wins.
        let index = build_index(tmp.path());
        assert_eq!(index.images_by_identity.len(), 1);
    }

    #[test]
    fn test_reindex_is_idempotent() {
        let tmp = tempdir().unwrap();
        let sub = tmp.path().join("DCIM");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("IMG_0001.jpg"), b"one").unwrap();
        fs::write(sub.join("IMG_0002.jpg"), b"two").unwrap();
        fs::write(sub.join("C0001.mp4"), b"three").unwrap();

        let first = build_index(tmp.path());
        let second = build_index(tmp.path());

        let keys = |idx: &VolumeIndex| {
            let mut all: Vec<String> = idx
                .videos_by_identity
                .keys()
                .chain(idx.images_by_identity.keys())
                .cloned()
                .collect();
            all.sort();
            all
        };
        assert_eq!(keys(&first), keys(&second));

        for (identity, record) in &first.images_by_identity {
            let other = &second.images_by_identity[identity];
            assert_eq!(record, other);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_media_file_is_skipped_and_recorded() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("ok.jpg"), b"readable").unwrap();
        let locked = tmp.path().join("locked.jpg");
        fs::write(&locked, b"no access").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to exercise in that case.
        if fs::File::open(&locked).is_ok() {
            return;
        }

        let index = build_index(tmp.path());
        assert_eq!(index.images_by_identity.len(), 1);
        assert_eq!(
            index
                .images_by_identity
                .values()
                .next()
                .unwrap()
                .display_name,
            "ok.jpg"
        );
        assert_eq!(index.unreadable.len(), 1);
        assert_eq!(index.unreadable[0].location, locked);
        assert!(!index.unreadable[0].reason.is_empty());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_empty_volume_yields_empty_index() {
        let tmp = tempdir().unwrap();
        let index = build_index(tmp.path());
        assert!(index.is_empty());
        assert_eq!(index.total_bytes(), 0);
    }
}
