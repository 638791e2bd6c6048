//! TOML configuration.
//!
//! Resolution order: explicit `--config` path, then `LECTIO_CONFIG`, then
//! `$HOME/.lectio/config.toml`. A missing default file means "all defaults";
//! a missing file that was named explicitly is an error.

use crate::core::curriculum::Locale;
use crate::core::db;
use crate::core::error::LectioError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "LECTIO_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite file; defaults to `$HOME/.lectio/lectio.db`.
    pub path: Option<PathBuf>,
    /// Byte budget for the whole keyspace. `0` disables the limit.
    pub quota_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: None,
            quota_bytes: schemas::DEFAULT_QUOTA_BYTES,
        }
    }
}

impl StorageConfig {
    pub fn quota(&self) -> Option<u64> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }

    pub fn db_path(&self) -> Result<PathBuf, LectioError> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(db::kv_db_path(&lectio_home()?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Simulated round-trip latency applied to every service call.
    pub latency_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { latency_ms: 100 }
    }
}

impl ServiceConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LectioConfig {
    pub storage: StorageConfig,
    pub service: ServiceConfig,
    pub reading: ReadingConfig,
    pub log: LogConfig,
}

pub fn lectio_home() -> Result<PathBuf, LectioError> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(|h| PathBuf::from(h).join(".lectio"))
        .ok_or_else(|| LectioError::NotFound("HOME is not set".to_string()))
}

impl LectioConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, LectioError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, LectioError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        if let Some(path) = named {
            if !path.exists() {
                return Err(LectioError::NotFound(format!(
                    "config file {}",
                    path.display()
                )));
            }
            return Self::read(&path);
        }

        match lectio_home() {
            Ok(home) if home.join(CONFIG_FILE_NAME).exists() => {
                Self::read(&home.join(CONFIG_FILE_NAME))
            }
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self, LectioError> {
        let content = fs::read_to_string(path).map_err(LectioError::IoError)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
