use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::options::{MediaFormat, Quality, DEFAULT_FILENAME_TEMPLATE, DEFAULT_SUBTITLE_LANGS};
use crate::utils::error_log::DEFAULT_LOG_FILE;
use crate::{Error, Result};

/// Keys accepted by `config get` / `config set`.
pub const KEYS: &[&str] = &[
    "ytdlp_path",
    "download_dir",
    "default_format",
    "default_quality",
    "subtitle_langs",
    "filename_template",
    "show_progress",
    "open_folder",
    "auto_install",
    "log_file",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to yt-dlp executable, if not in PATH
    pub ytdlp_path: Option<PathBuf>,

    /// Default download directory; the current directory when unset
    pub download_dir: Option<PathBuf>,

    /// Default container
    pub default_format: MediaFormat,

    /// Default quality tier
    pub default_quality: Quality,

    /// Languages passed to `--sub-langs`
    pub subtitle_langs: String,

    /// yt-dlp output template used when no filename is given
    pub filename_template: String,

    /// Whether to show progress bars
    pub show_progress: bool,

    /// Whether to open the destination folder after a download
    pub open_folder: bool,

    /// Whether to try `pip install yt-dlp` when it is missing
    pub auto_install: bool,

    /// File that failed downloads are appended to
    pub log_file: PathBuf,
}

impl Config {
    /// `<config_dir>/media-dl/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("media-dl")
            .join("config.toml")
    }

    /// Load config from file or create default if not exists
    pub fn load() -> Self {
        let config_path = Self::default_path();

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => log::warn!("{}; using defaults", e),
            }
            return Self::default();
        }

        let config = Self::default();
        if let Err(e) = config.save_to(&config_path) {
            log::debug!("could not write default config: {}", e);
        }
        config
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Current value of `key`, formatted for display.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "ytdlp_path" => self
                .ytdlp_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Using system PATH".to_string()),
            "download_dir" => self
                .download_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Current directory".to_string()),
            "default_format" => self.default_format.to_string(),
            "default_quality" => self.default_quality.to_string(),
            "subtitle_langs" => self.subtitle_langs.clone(),
            "filename_template" => self.filename_template.clone(),
            "show_progress" => self.show_progress.to_string(),
            "open_folder" => self.open_folder.to_string(),
            "auto_install" => self.auto_install.to_string(),
            "log_file" => self.log_file.display().to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Updates `key` from its string form. `none` clears optional paths.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "ytdlp_path" => self.ytdlp_path = optional_path(value),
            "download_dir" => self.download_dir = optional_path(value),
            "default_format" => self.default_format = value.parse()?,
            "default_quality" => self.default_quality = value.parse()?,
            "subtitle_langs" => self.subtitle_langs = non_empty(key, value)?,
            "filename_template" => self.filename_template = non_empty(key, value)?,
            "show_progress" => self.show_progress = parse_bool(key, value)?,
            "open_folder" => self.open_folder = parse_bool(key, value)?,
            "auto_install" => self.auto_install = parse_bool(key, value)?,
            "log_file" => self.log_file = PathBuf::from(non_empty(key, value)?),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "unknown key '{}'; available keys: {}",
        key,
        KEYS.join(", ")
    ))
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", key)));
    }
    Ok(value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.trim().parse::<bool>().map_err(|_| {
        Error::Config(format!("invalid value for {}. Use 'true' or 'false'", key))
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            download_dir: None,
            default_format: MediaFormat::Mp4,
            default_quality: Quality::High,
            subtitle_langs: DEFAULT_SUBTITLE_LANGS.to_string(),
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            show_progress: true,
            open_folder: true,
            auto_install: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}
