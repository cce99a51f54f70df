use recipebox_core::screens::DEFAULT_JOIN_CONCURRENCY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "RECIPEBOX_DATA_DIR";
const JOIN_CONCURRENCY_ENV: &str = "RECIPEBOX_JOIN_CONCURRENCY";

/// Where a setting's current value came from. Later layers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl ConfigSource {
    fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "environment",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
        }
    }

    fn set(&mut self, value: T, source: ConfigSource) {
        self.value = value;
        self.source = source;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the store, accounts and session files
    pub data_dir: ConfigValue<PathBuf>,
    /// Profile lookups in flight while resolving author names
    pub join_concurrency: ConfigValue<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// The YAML file as written by the user; every key is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileLayer {
    data_dir: Option<PathBuf>,
    join_concurrency: Option<usize>,
}

impl Config {
    /// Defaults, then the YAML file, then `RECIPEBOX_*` environment variables.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self {
            data_dir: ConfigValue::default_value(Self::default_data_dir()),
            join_concurrency: ConfigValue::default_value(DEFAULT_JOIN_CONCURRENCY),
            config_file: None,
        };

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            config.apply_file(&path)?;
        }
        config.apply_env()?;

        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        let layer: FileLayer = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;

        if let Some(dir) = layer.data_dir {
            let dir = match path.parent() {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir,
            };
            self.data_dir.set(dir, ConfigSource::File);
        }
        if let Some(n) = layer.join_concurrency {
            let n = positive_concurrency(n, &n.to_string())?;
            self.join_concurrency.set(n, ConfigSource::File);
        }
        self.config_file = Some(path.to_path_buf());
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            self.data_dir.set(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var(JOIN_CONCURRENCY_ENV) {
            let n = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid_concurrency(&raw))
                .and_then(|n| positive_concurrency(n, &raw))?;
            self.join_concurrency.set(n, ConfigSource::Environment);
        }
        Ok(())
    }

    /// `<platform config dir>/recipebox`
    pub fn default_config_dir() -> PathBuf {
        platform_dir(dirs::config_dir())
    }

    /// `<platform data dir>/recipebox`
    pub fn default_data_dir() -> PathBuf {
        platform_dir(dirs::data_dir())
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn platform_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("recipebox")
}

fn positive_concurrency(n: usize, raw: &str) -> Result<usize, ConfigError> {
    if n == 0 {
        Err(invalid_concurrency(raw))
    } else {
        Ok(n)
    }
}

fn invalid_concurrency(raw: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: "join_concurrency",
        value: raw.to_string(),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Cannot read config file {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Config file {} is not valid YAML: {}", path.display(), e)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: '{}' (expected a positive integer)", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
