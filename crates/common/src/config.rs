//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory for accounts, the session file, blobs and records.
    pub data_dir: PathBuf,

    /// Camera capture settings.
    #[serde(default)]
    pub capture: CaptureDefaults,

    /// Upload settings.
    #[serde(default)]
    pub upload: UploadDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default camera parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Device node used for the front-facing camera.
    pub front_device: String,

    /// Device node used for the rear-facing camera.
    pub back_device: String,

    /// Recording frame rate.
    pub fps: u32,

    /// Directory finished clips are written to before upload.
    /// Defaults to `<data_dir>/captures` when unset.
    pub clips_dir: Option<PathBuf>,
}

/// Upload tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadDefaults {
    /// Bytes written per resumable-transfer chunk.
    pub chunk_size: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipsync=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            capture: CaptureDefaults::default(),
            upload: UploadDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            front_device: "/dev/video0".to_string(),
            back_device: "/dev/video1".to_string(),
            fps: 30,
            clips_dir: None,
        }
    }
}

impl Default for UploadDefaults {
    fn default() -> Self {
        Self {
            chunk_size: 256 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Where finished clips land before upload.
    pub fn clips_dir(&self) -> PathBuf {
        self.capture
            .clips_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("captures"))
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("auth").join("accounts.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("auth").join("session.json")
    }

    pub fn blob_root(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipsync").join("config.json")
}

/// Default data directory.
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("clipsync")
}
