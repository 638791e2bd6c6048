//! Keyspace abstraction for lectio's on-device state.
//!
//! All persisted records (identity pointer, progress, status ledger, archive,
//! journals, transient content cache) share one flat key/value keyspace. Two
//! backends implement it: an in-memory map (tests, ephemeral sessions) and a
//! SQLite table (the default on-device store).

use crate::core::config::{StorageBackend, StorageConfig};
use crate::core::db::SqliteKv;
use crate::core::error::LectioError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Flat string keyspace with an explicit prefix index.
///
/// Values handed out are always owned copies; mutating them never touches
/// stored state. Single-key writes are atomic, nothing spans keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LectioError>;
    /// Fails with [`LectioError::QuotaExceeded`] when the write would push
    /// the keyspace past its byte budget.
    fn set(&self, key: &str, value: &str) -> Result<(), LectioError>;
    fn remove(&self, key: &str) -> Result<(), LectioError>;
    /// Entries whose key starts with `prefix`, ordered by key.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, LectioError>;
    fn len(&self) -> Result<usize, LectioError>;
    fn usage_bytes(&self) -> Result<u64, LectioError>;
    fn clear(&self) -> Result<(), LectioError>;
}

/// Bytes charged against the quota for one entry.
pub fn entry_bytes(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

pub(crate) fn check_quota(
    quota: Option<u64>,
    current: u64,
    replaced: u64,
    added: u64,
) -> Result<(), LectioError> {
    if let Some(quota) = quota {
        let needed = current.saturating_sub(replaced) + added;
        if needed > quota {
            return Err(LectioError::QuotaExceeded { needed, quota });
        }
    }
    Ok(())
}

/// Smallest string greater than every string starting with `prefix`.
/// `None` means the range is unbounded above.
pub(crate) fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let mut next = last as u32 + 1;
        if next == 0xD800 {
            next = 0xE000;
        }
        if let Some(c) = char::from_u32(next) {
            chars.push(c);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

/// In-process keyspace backed by an ordered map.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, LectioError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LectioError> {
        let mut entries = self.lock();
        if self.quota_bytes.is_some() {
            let current: u64 = entries.iter().map(|(k, v)| entry_bytes(k, v)).sum();
            let replaced = entries.get(key).map(|v| entry_bytes(key, v)).unwrap_or(0);
            check_quota(self.quota_bytes, current, replaced, entry_bytes(key, value))?;
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LectioError> {
        self.lock().remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, LectioError> {
        let entries = self.lock();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn len(&self) -> Result<usize, LectioError> {
        Ok(self.lock().len())
    }

    fn usage_bytes(&self) -> Result<u64, LectioError> {
        Ok(self.lock().iter().map(|(k, v)| entry_bytes(k, v)).sum())
    }

    fn clear(&self) -> Result<(), LectioError> {
        self.lock().clear();
        Ok(())
    }
}

/// Backend discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// Ephemeral map, lost when the process exits.
    Memory,
    /// SQLite file on disk.
    Sqlite,
}

/// Cloneable handle to the process-wide keyspace.
#[derive(Clone)]
pub struct Store {
    pub kind: StoreKind,
    /// Database file for SQLite stores.
    pub path: Option<PathBuf>,
    kv: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn in_memory() -> Self {
        Self::from_backend(StoreKind::Memory, None, Arc::new(MemoryKv::new()))
    }

    pub fn in_memory_with_quota(quota_bytes: u64) -> Self {
        Self::from_backend(
            StoreKind::Memory,
            None,
            Arc::new(MemoryKv::with_quota(quota_bytes)),
        )
    }

    pub fn sqlite(path: &Path, quota_bytes: Option<u64>) -> Result<Self, LectioError> {
        let kv = SqliteKv::open(path, quota_bytes)?;
        Ok(Self::from_backend(
            StoreKind::Sqlite,
            Some(path.to_path_buf()),
            Arc::new(kv),
        ))
    }

    /// Wrap an arbitrary backend, e.g. an instrumented one in tests.
    pub fn from_backend(kind: StoreKind, path: Option<PathBuf>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kind, path, kv }
    }

    pub fn open(config: &StorageConfig) -> Result<Self, LectioError> {
        let quota = config.quota();
        match config.backend {
            StorageBackend::Memory => Ok(match quota {
                Some(q) => Self::in_memory_with_quota(q),
                None => Self::in_memory(),
            }),
            StorageBackend::Sqlite => Self::sqlite(&config.db_path()?, quota),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, LectioError> {
        self.kv.get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), LectioError> {
        self.kv.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<(), LectioError> {
        self.kv.remove(key)
    }

    pub fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, LectioError> {
        self.kv.scan_prefix(prefix)
    }

    pub fn len(&self) -> Result<usize, LectioError> {
        self.kv.len()
    }

    pub fn is_empty(&self) -> Result<bool, LectioError> {
        Ok(self.kv.len()? == 0)
    }

    pub fn usage_bytes(&self) -> Result<u64, LectioError> {
        self.kv.usage_bytes()
    }

    pub fn clear(&self) -> Result<(), LectioError> {
        self.kv.clear()
    }
}
