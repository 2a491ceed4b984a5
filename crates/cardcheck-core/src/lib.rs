pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod progress;
pub mod reconcile;
pub mod volumes;

pub use config::AppConfig;
pub use engine::{CheckEngine, CheckReport};
pub use error::Error;
pub use index::{FileRecord, MediaKind, UnreadableFile, VolumeIndex};
pub use progress::{ProgressReporter, SilentReporter};
pub use reconcile::{FileStatus, ReconcileOutcome};
pub use volumes::Volume;
