use cardcheck_core::{FileRecord, FileStatus, ProgressReporter};
use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;

/// CLI progress reporter using indicatif.
///
/// - Index phase: one spinner per volume (backups index concurrently)
/// - Verify phase: a single progress bar (total known from the source index)
pub struct CliReporter {
    multi: MultiProgress,
    index_bars: Mutex<HashMap<String, ProgressBar>>,
    verify_bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            index_bars: Mutex::new(HashMap::new()),
            verify_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }
}

impl Default for CliReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CliReporter {
    fn on_index_start(&self, volume: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_message(format!("Indexing {}...", volume));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.index_bars
            .lock()
            .unwrap()
            .insert(volume.to_string(), pb);
    }

    fn on_index_progress(&self, volume: &str, files_indexed: usize, bytes_indexed: u64) {
        let guard = self.index_bars.lock().unwrap();
        if let Some(pb) = guard.get(volume) {
            pb.set_message(format!(
                "Indexing {}... {} files ({})",
                volume,
                files_indexed,
                HumanBytes(bytes_indexed)
            ));
        }
    }

    fn on_index_complete(&self, volume: &str, total_files: usize, duration_secs: f64) {
        if let Some(pb) = self.index_bars.lock().unwrap().remove(volume) {
            pb.finish_and_clear();
        }
        eprintln!(
            "  \x1b[32m✓\x1b[0m Indexed {}: {} media files in {:.2}s",
            volume, total_files, duration_secs
        );
    }

    fn on_verify_start(&self, total_files: usize) {
        let pb = self.multi.add(ProgressBar::new(total_files as u64));
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Verifying [{bar:30.cyan/dim}] {pos}/{len} files ({eta} remaining)",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        *self.verify_bar.lock().unwrap() = Some(pb);
    }

    fn on_file_status(&self, record: &FileRecord, status: FileStatus) {
        let line = match status {
            FileStatus::Verified => return,
            FileStatus::Missing => {
                format!("  \x1b[31m✗\x1b[0m missing   {}", record.display_name)
            }
            FileStatus::Corrupted => {
                format!("  \x1b[31m✗\x1b[0m corrupted {}", record.display_name)
            }
        };
        let guard = self.verify_bar.lock().unwrap();
        match guard.as_ref() {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn on_verify_progress(&self, files_verified: usize, _total_files: usize) {
        let guard = self.verify_bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(files_verified as u64);
        }
    }

    fn on_verify_complete(
        &self,
        verified: usize,
        missing: usize,
        corrupted: usize,
        duration_secs: f64,
    ) {
        if let Some(pb) = self.verify_bar.lock().unwrap().take() {
            pb.finish_and_clear();
        }
        eprintln!(
            "  \x1b[32m✓\x1b[0m Verify complete: {} verified, {} missing, {} corrupted in {:.2}s",
            verified, missing, corrupted, duration_secs
        );
    }
}
