use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FONTS_API_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts";
pub const FONTS_API_KEY_ENV: &str = "QMLBRIDGE_FONTS_API_KEY";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the persistent store lives; falls back to the user data dir.
    pub store_dir: Option<PathBuf>,
    pub fonts: FontsConfig,
    pub archive: ArchiveConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_FONTS_API_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub compression_level: i64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub max_size_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            fonts: FontsConfig::default(),
            archive: ArchiveConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Priority: explicit path > central config file > defaults. The fonts
    /// API key environment variable is applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::central_config_path().filter(|p| p.is_file()) {
                Some(central) => Self::from_file(&central)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(FONTS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.fonts.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fonts.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "fonts.timeout must be greater than zero".to_string(),
            ));
        }
        if !(0..=9).contains(&self.archive.compression_level) {
            return Err(ConfigError::Invalid(format!(
                "archive.compression_level must be within 0..=9, got {}",
                self.archive.compression_level
            )));
        }
        if self.upload.max_size_bytes == 0 {
            return Err(ConfigError::Invalid(
                "upload.max_size_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/qmlbridge/config.toml`, else `~/.config/qmlbridge/config.toml`.
    pub fn central_config_path() -> Option<PathBuf> {
        xdg_dir("XDG_CONFIG_HOME", ".config").map(|dir| dir.join("qmlbridge").join("config.toml"))
    }

    /// Store directory: configured value, else the user data dir, else `./.qmlbridge`.
    pub fn resolved_store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            xdg_dir("XDG_DATA_HOME", ".local/share")
                .map(|dir| dir.join("qmlbridge").join("store"))
                .unwrap_or_else(|| PathBuf::from(".qmlbridge"))
        })
    }
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback)))
}
