// Configuration store: a small JSON file holding the API key and the
// logger colors. Reads never fail (they fall back to the defaults) and
// writes merge a partial update over what is already stored.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::logger::{Level, Logger, Palette};

/// Errors raised while loading or persisting the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to access config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent settings, stored as `{"apiKey": ..., "logger": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api_key: String,
    pub logger: LoggerColors,
}

impl Config {
    /// Apply `partial` on top of `self`. Logger colors merge one level at
    /// a time, so setting `info` keeps the stored `warn` and `error`.
    pub fn merge(&self, partial: &PartialConfig) -> Self {
        let mut merged = self.clone();
        if let Some(api_key) = &partial.api_key {
            merged.api_key.clone_from(api_key);
        }
        if let Some(logger) = &partial.logger {
            for (level, color) in [
                (Level::Info, &logger.info),
                (Level::Warn, &logger.warn),
                (Level::Error, &logger.error),
            ] {
                if let Some(color) = color {
                    merged.logger.set(level, color.clone());
                }
            }
        }
        merged
    }

    /// The API key, or `None` when it was never configured.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// ANSI color code used as the prefix of each log level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerColors {
    pub info: String,
    pub warn: String,
    pub error: String,
}

impl Default for LoggerColors {
    fn default() -> Self {
        Self {
            info: Palette::Blue.ansi_code().to_string(),
            warn: Palette::Yellow.ansi_code().to_string(),
            error: Palette::Red.ansi_code().to_string(),
        }
    }
}

impl LoggerColors {
    pub fn get(&self, level: Level) -> &str {
        match level {
            Level::Info => &self.info,
            Level::Warn => &self.warn,
            Level::Error => &self.error,
        }
    }

    pub fn set(&mut self, level: Level, color: String) {
        match level {
            Level::Info => self.info = color,
            Level::Warn => self.warn = color,
            Level::Error => self.error = color,
        }
    }
}

/// A configuration update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub api_key: Option<String>,
    pub logger: Option<PartialLoggerColors>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialLoggerColors {
    pub info: Option<String>,
    pub warn: Option<String>,
    pub error: Option<String>,
}

impl PartialConfig {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Update a single level's color.
    pub fn logger_color(level: Level, color: impl Into<String>) -> Self {
        let mut colors = PartialLoggerColors::default();
        let slot = match level {
            Level::Info => &mut colors.info,
            Level::Warn => &mut colors.warn,
            Level::Error => &mut colors.error,
        };
        *slot = Some(color.into());
        Self {
            logger: Some(colors),
            ..Self::default()
        }
    }

    /// Update every logger color at once.
    pub fn logger(colors: LoggerColors) -> Self {
        Self {
            logger: Some(PartialLoggerColors {
                info: Some(colors.info),
                warn: Some(colors.warn),
                error: Some(colors.error),
            }),
            ..Self::default()
        }
    }
}

impl From<Config> for PartialConfig {
    fn from(config: Config) -> Self {
        Self {
            api_key: Some(config.api_key),
            ..Self::logger(config.logger)
        }
    }
}

/// File-backed configuration. There is no locking: two concurrent
/// invocations doing read-modify-write can lose one of the updates.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/shortify/config.json`, or `./shortify/config.json`
    /// on platforms without a config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shortify")
            .join("config.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load and parse the file without any fallback.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Load the configuration, reporting any problem through `logger` and
    /// falling back to the defaults.
    pub fn read(&self, logger: &Logger) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(err @ ConfigError::NotFound { .. }) => {
                logger.warn(format!("{err}, using default configuration"));
                Config::default()
            }
            Err(err) => {
                logger.error(format!("Error reading config file: {err}"));
                Config::default()
            }
        }
    }

    /// Merge `partial` over the stored configuration and persist the
    /// result. On failure the stored file is left as it was, the error is
    /// reported and the configuration from before the merge is returned.
    pub fn write(&self, partial: &PartialConfig, logger: &Logger) -> Config {
        let current = self.current(logger);
        match self.store_merged(&current, partial, logger) {
            Ok(merged) => merged,
            Err(err) => {
                logger.error(format!("Error writing config file: {err}"));
                current
            }
        }
    }

    /// Like [`ConfigStore::write`], but hands a failed write back to the
    /// caller instead of reporting it.
    pub fn try_write(
        &self,
        partial: &PartialConfig,
        logger: &Logger,
    ) -> Result<Config, ConfigError> {
        let current = self.current(logger);
        self.store_merged(&current, partial, logger)
    }

    /// Write the default configuration unless a file already exists.
    /// `force` overwrites an existing file.
    pub fn create(&self, force: bool, logger: &Logger) -> Result<Config, ConfigError> {
        if self.exists() && !force {
            logger.warn("The config file already exists. Use --reset to overwrite.");
            return Ok(self.read(logger));
        }
        if force {
            logger.warn("Resetting config file to default values.");
        } else {
            logger.info("Creating config file with default values.");
        }
        self.try_write(&PartialConfig::from(Config::default()), logger)
    }

    // Base for a merge. A missing file is the normal first-run case and
    // stays quiet; anything else is reported and replaced by the defaults.
    fn current(&self, logger: &Logger) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(ConfigError::NotFound { .. }) => Config::default(),
            Err(err) => {
                logger.error(format!("Error reading config file: {err}"));
                Config::default()
            }
        }
    }

    fn store_merged(
        &self,
        current: &Config,
        partial: &PartialConfig,
        logger: &Logger,
    ) -> Result<Config, ConfigError> {
        let merged = current.merge(partial);
        self.persist(&merged)?;
        tracing::debug!(path = %self.path.display(), "config file written");
        logger.info("Config file updated successfully.");
        Ok(merged)
    }

    // Serialize into a sibling temp file, then rename it over the target.
    fn persist(&self, config: &Config) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(io_err)?;

        let body = serde_json::to_string_pretty(config)
            .map_err(|source| io_err(io::Error::new(io::ErrorKind::InvalidData, source)))?;
        let mut file = NamedTempFile::new_in(&dir).map_err(io_err)?;
        file.write_all(body.as_bytes()).map_err(io_err)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.persist(&self.path).map_err(|err| io_err(err.error))?;
        Ok(())
    }
}
