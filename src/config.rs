//! Configuration management.
//!
//! Settings come from a config file discovered with `prefer` (or given with
//! `--config`), parsed by extension, then overlaid with environment
//! variables. Credentials are only ever read from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default browser user agent for archive submissions.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("SCREENSHOTONE_ACCESS_KEY is not set")]
    MissingAccessKey,
}

/// Capture service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub api_url: String,
    /// Loaded from `SCREENSHOTONE_ACCESS_KEY`; never read from or written to files.
    #[serde(skip)]
    pub access_key: Option<String>,
    pub request_timeout_secs: u64,
    pub validation_timeout_secs: u64,
    /// Total attempts per capture, including the first.
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    /// Wait after a 429 from the capture service.
    pub rate_limit_delay_secs: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale_factor: u32,
    /// Settle delay before the capture is taken.
    pub delay_secs: u32,
    pub scroll_delay_ms: u32,
    /// Render timeout passed to the service.
    pub render_timeout_secs: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.screenshotone.com/take".to_string(),
            access_key: None,
            request_timeout_secs: 30,
            validation_timeout_secs: 10,
            max_attempts: 3,
            retry_delay_secs: 2,
            rate_limit_delay_secs: 10,
            viewport_width: 1920,
            viewport_height: 1080,
            device_scale_factor: 2,
            delay_secs: 3,
            scroll_delay_ms: 400,
            render_timeout_secs: 60,
        }
    }
}

impl CaptureSettings {
    pub fn require_access_key(&self) -> Result<&str, ConfigError> {
        self.access_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingAccessKey)
    }
}

/// OCR settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract executable name or path.
    pub binary: String,
    pub language: String,
    pub page_seg_mode: Option<u8>,
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: None,
            timeout_secs: 120,
        }
    }
}

/// Archive submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofSettings {
    pub enabled: bool,
    /// Save endpoint; the target URL is appended verbatim.
    pub wayback_save_url: String,
    pub archive_today_submit_url: String,
    pub user_agent: String,
}

impl Default for ProofSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            wayback_save_url: "https://web.archive.org/save/".to_string(),
            archive_today_submit_url: "https://archive.ph/submit/".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub database: String,
    pub screenshots_dir: String,
    /// Prefix for public screenshot URLs, without a trailing slash.
    pub public_base_url: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: "copyrot.db".to_string(),
            screenshots_dir: "screenshots".to_string(),
            public_base_url: "/screenshots".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Newline-delimited target list.
    pub targets: String,
    pub capture: CaptureSettings,
    pub ocr: OcrSettings,
    pub proof: ProofSettings,
    pub storage: StorageSettings,
    /// File the settings were loaded from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            targets: "targets.txt".to_string(),
            capture: CaptureSettings::default(),
            ocr: OcrSettings::default(),
            proof: ProofSettings::default(),
            storage: StorageSettings::default(),
            source_path: None,
        }
    }
}

impl Settings {
    /// Load settings from `explicit` if given, otherwise from a discovered
    /// `copyrot` config file, falling back to defaults. Environment
    /// overrides are always applied last.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::discover().await,
        };
        Ok(settings.with_env_overrides())
    }

    async fn discover() -> Self {
        let path = match prefer::load("copyrot").await {
            Ok(found) => found.source_path().map(|p| p.to_path_buf()),
            Err(_) => None,
        };

        let Some(path) = path else {
            tracing::debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load_from_path(&path).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file.
    /// The format is chosen by extension: TOML, YAML, or JSON otherwise.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut settings: Settings = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string()))?,
        };

        tracing::debug!("Loaded config from {}", path.display());
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, ignoring blank values.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("SCREENSHOTONE_ACCESS_KEY") {
            self.capture.access_key = Some(key);
        }
        if let Some(url) = get("SCREENSHOTONE_API_URL") {
            self.capture.api_url = url;
        }
        if let Some(targets) = get("TARGETS") {
            self.targets = targets;
        }
        if let Some(database) = get("COPYROT_DATABASE") {
            self.storage.database = database;
        }
        if let Some(dir) = get("COPYROT_SCREENSHOTS_DIR") {
            self.storage.screenshots_dir = dir;
        }
        if let Some(base) = get("COPYROT_PUBLIC_BASE_URL") {
            self.storage.public_base_url = base;
        }
        if let Some(language) = get("TESSERACT_LANG") {
            self.ocr.language = language;
        }
        self
    }

    /// Directory relative paths resolve against: the config file's
    /// directory when one was loaded.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(Path::to_path_buf))
    }

    /// Resolve a configured path. Absolute paths are returned as-is.
    pub fn resolve_path(&self, value: &str) -> PathBuf {
        let path = Path::new(value);
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
