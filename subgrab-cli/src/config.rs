use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use subgrab::{LanguagePriority, RetryPolicy};
use yt_source::whisper::DEFAULT_WHISPER_MODEL;

use crate::error::{CliError, Result};

const CONFIG_DIR_NAME: &str = "subgrab";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

/// Application configuration, read from TOML. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory that per-channel output directories are created in
    pub output_root: PathBuf,
    /// Cookie file for yt-dlp, used only when it exists
    pub cookie_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub ytdlp: YtDlpSettings,
    pub whisper: WhisperSettings,
    pub languages: LanguagePriority,
    pub retry: RetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            cookie_file: Some(PathBuf::from(DEFAULT_COOKIE_FILE)),
            log_dir: None,
            ytdlp: YtDlpSettings::default(),
            whisper: WhisperSettings::default(),
            languages: LanguagePriority::default(),
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpSettings {
    pub binary_path: Option<String>,
    pub extra_args: Vec<String>,
    /// Warn when the installed yt-dlp looks outdated
    pub check_version: bool,
    /// Run `yt-dlp -U` when it does
    pub auto_update: bool,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            binary_path: None,
            extra_args: Vec::new(),
            check_version: true,
            auto_update: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperSettings {
    pub enabled: bool,
    pub binary_path: Option<String>,
    pub model: String,
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            binary_path: None,
            model: DEFAULT_WHISPER_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub backoff_multiplier: f64,
    pub max_delay_secs: u64,
    pub use_jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_secs: policy.base_delay.as_secs(),
            backoff_multiplier: policy.backoff_multiplier,
            max_delay_secs: policy.max_delay.as_secs(),
            use_jitter: policy.use_jitter,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs(self.base_delay_secs),
            backoff_multiplier: self.backoff_multiplier,
            max_delay: Duration::from_secs(self.max_delay_secs),
            use_jitter: self.use_jitter,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the user config directory when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()
                .ok_or_else(|| CliError::config("could not determine config directory"))?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.show()?)?;
        Ok(path)
    }

    pub fn reset(path: Option<&Path>) -> Result<PathBuf> {
        Self::default().save(path)
    }

    pub fn show(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
