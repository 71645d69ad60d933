use crate::workflow::params::{DEFAULT_INTERVAL_SECS, DEFAULT_MAX_WINDOW_SECS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const API_URL_ENV: &str = "SUBTITLE_API_URL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the extraction service.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Timeout for a single upload or extraction request. Extraction of a
    /// long window can take minutes.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Every notification is appended here when set.
    #[serde(default)]
    pub notice_log: Option<PathBuf>,
    /// Directory exported results are written to when no save dialog is
    /// available. Defaults to the working directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: PathBuf,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: PathBuf,
    /// Initial sampling interval in seconds.
    #[serde(default = "default_interval")]
    pub default_interval: f64,
    /// Upper bound of the initial time window after a video is loaded.
    #[serde(default = "default_max_window")]
    pub max_initial_window_secs: f64,
}

fn default_api_url() -> String {
    "http://localhost:8000".into()
}

fn default_request_timeout() -> u64 {
    600
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_max_window() -> f64 {
    DEFAULT_MAX_WINDOW_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            debug_logging: false,
            log_file: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            notice_log: None,
            export_dir: None,
            ffprobe_path: default_ffprobe(),
            ffmpeg_path: default_ffmpeg(),
            default_interval: default_interval(),
            max_initial_window_secs: default_max_window(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields defaults.
    /// `SUBTITLE_API_URL` overrides the configured service URL.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let mut settings: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(&content)?
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                settings.api_url = url;
            }
        }
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
