use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LectioError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage quota exceeded: write needs {needed} bytes, quota is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("Malformed backup document: {0}")]
    MalformedBackup(String),
    #[error("Content generation failed: {0}")]
    Generation(String),
}

impl LectioError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, LectioError::QuotaExceeded { .. })
    }
}
