use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory where mounted removable volumes appear.
    #[serde(default = "default_volumes_dir")]
    pub volumes_dir: String,

    /// Volume labels that are never offered for checking (the internal disk).
    #[serde(default = "default_ignore_volumes")]
    pub ignore_volumes: Vec<String>,

    /// Directory names pruned entirely during a volume walk, e.g. the
    /// thumbnail cache folders some cameras keep next to their video files.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Bytes read per sampled region when fingerprinting a file.
    #[serde(default = "default_sample_chunk_bytes")]
    pub sample_chunk_bytes: usize,

    /// Number of evenly spaced regions sampled per file.
    #[serde(default = "default_sample_regions")]
    pub sample_regions: usize,
}

fn default_volumes_dir() -> String {
    "/Volumes".to_string()
}

fn default_ignore_volumes() -> Vec<String> {
    vec!["Macintosh HD".to_string()]
}

fn default_ignore_dirs() -> Vec<String> {
    vec!["THMBNL".to_string()]
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "heic", "tiff", "webp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_video_extensions() -> Vec<String> {
    ["mp4", "mov", "avi", "mkv", "m4v", "wmv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_sample_chunk_bytes() -> usize {
    16 * 1024
}

fn default_sample_regions() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            volumes_dir: default_volumes_dir(),
            ignore_volumes: default_ignore_volumes(),
            ignore_dirs: default_ignore_dirs(),
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
            sample_chunk_bytes: default_sample_chunk_bytes(),
            sample_regions: default_sample_regions(),
        }
    }
}

impl AppConfig {
    /// The image and video extension sets must be disjoint — a file is
    /// classified as at most one media kind.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_chunk_bytes == 0 {
            return Err(Error::InvalidConfig(
                "sample_chunk_bytes must be at least 1".to_string(),
            ));
        }
        if self.sample_regions == 0 {
            return Err(Error::InvalidConfig(
                "sample_regions must be at least 1".to_string(),
            ));
        }
        for ext in &self.image_extensions {
            if self
                .video_extensions
                .iter()
                .any(|v| v.eq_ignore_ascii_case(ext))
            {
                return Err(Error::InvalidConfig(format!(
                    "extension '{}' is listed as both image and video",
                    ext
                )));
            }
        }
        Ok(())
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_common_camera_formats() {
        let config = AppConfig::default();
        assert!(config.image_extensions.contains(&"jpg".to_string()));
        assert!(config.video_extensions.contains(&"mp4".to_string()));
        assert!(config.ignore_dirs.contains(&"THMBNL".to_string()));
        assert_eq!(config.sample_chunk_bytes, 16 * 1024);
        assert_eq!(config.sample_regions, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlapping_extension_sets() {
        let config = AppConfig {
            image_extensions: vec!["jpg".to_string(), "mp4".to_string()],
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sampling_params() {
        let config = AppConfig {
            sample_regions: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            sample_chunk_bytes: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
