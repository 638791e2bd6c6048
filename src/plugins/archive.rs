//! Archive of completed readings.
//!
//! Each reading is its own key, `{user}_archived-reading-{id}`, so a single
//! corrupt record never takes the rest down with it and the whole archive
//! is recoverable with one prefix scan. Images are never persisted here;
//! they only live in the transient content cache.

use crate::core::error;
use crate::core::namespace::{UserId, namespaced_key};
use crate::core::schedule::reference_key;
use crate::core::schemas::ARCHIVED_READING_PREFIX;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::content;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `day` value of readings outside the sequential plan.
pub const NON_SEQUENTIAL_DAY: i64 = -1;

/// Archive slot: a plan day, or an opaque key for a free selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArchiveId {
    Day(u32),
    Manual(String),
}

impl ArchiveId {
    /// Slot for a free selection, derived from its reference text.
    pub fn manual_for_reference(reference: &str) -> Self {
        ArchiveId::Manual(format!("manual-{}", reference_key(reference)))
    }

    /// Inverse of `Display`: canonical decimal fragments (no sign, no
    /// leading zeros) are plan days, anything else is kept verbatim.
    pub fn parse(fragment: &str) -> Self {
        match fragment.parse::<u32>() {
            Ok(day) if fragment == day.to_string() => ArchiveId::Day(day),
            _ => ArchiveId::Manual(fragment.to_string()),
        }
    }

    pub fn day(&self) -> Option<u32> {
        match self {
            ArchiveId::Day(day) => Some(*day),
            ArchiveId::Manual(_) => None,
        }
    }
}

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveId::Day(day) => write!(f, "{day}"),
            ArchiveId::Manual(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedReading {
    /// Plan day, or [`NON_SEQUENTIAL_DAY`].
    pub day: i64,
    pub date_saved: String,
    pub reading_reference: String,
    pub passage: String,
    pub meditation_guide: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub intention: String,
    #[serde(default)]
    pub context_image_url: Option<String>,
}

impl ArchivedReading {
    pub fn is_sequential(&self) -> bool {
        self.day >= 1
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        time::parse_iso(&self.date_saved)
    }
}

pub fn archive_prefix(user: Option<&UserId>) -> String {
    namespaced_key(user, ARCHIVED_READING_PREFIX)
}

pub fn archive_key(user: Option<&UserId>, id: &ArchiveId) -> String {
    format!("{}{}", archive_prefix(user), id)
}

fn decode(key: &str, raw: &str) -> Option<ArchivedReading> {
    match serde_json::from_str(raw) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!(key, error = %e, "skipping malformed archived reading");
            None
        }
    }
}

pub fn get(
    store: &Store,
    user: Option<&UserId>,
    id: &ArchiveId,
) -> Result<Option<ArchivedReading>, error::LectioError> {
    let key = archive_key(user, id);
    Ok(store.get(&key)?.and_then(|raw| decode(&key, &raw)))
}

/// Persist `reading` under `id` without its image.
///
/// A quota failure triggers one eviction of the transient content cache and
/// one retry; if the retry fails too, that error is returned.
pub fn put(
    store: &Store,
    user: Option<&UserId>,
    id: &ArchiveId,
    reading: &ArchivedReading,
) -> Result<(), error::LectioError> {
    let mut stored = reading.clone();
    stored.context_image_url = None;

    let key = archive_key(user, id);
    let payload = serde_json::to_string(&stored)?;

    if matches!(id, ArchiveId::Manual(_)) {
        warn_on_key_collision(store, &key, &stored);
    }

    match store.set(&key, &payload) {
        Err(e) if e.is_quota_exceeded() => {
            tracing::warn!(key = %key, error = %e, "storage quota exceeded, evicting content cache");
            let evicted = content::evict_all(store)?;
            tracing::info!(evicted, key = %key, "retrying archive write after eviction");
            store.set(&key, &payload)
        }
        other => other,
    }
}

// Distinct references can strip to the same manual key; surface it rather
// than silently replace someone else's reading.
fn warn_on_key_collision(store: &Store, key: &str, incoming: &ArchivedReading) {
    if let Ok(Some(raw)) = store.get(key)
        && let Some(existing) = decode(key, &raw)
        && existing.reading_reference != incoming.reading_reference
    {
        tracing::warn!(
            key,
            existing = %existing.reading_reference,
            incoming = %incoming.reading_reference,
            "manual archive key collision; overwriting"
        );
    }
}

pub fn remove(store: &Store, user: Option<&UserId>, id: &ArchiveId) -> Result<(), error::LectioError> {
    store.remove(&archive_key(user, id))
}

/// Every archived reading of `user`, keyed by slot. Malformed records are
/// logged and skipped.
pub fn list_all(
    store: &Store,
    user: Option<&UserId>,
) -> Result<BTreeMap<ArchiveId, ArchivedReading>, error::LectioError> {
    let prefix = archive_prefix(user);
    let mut out = BTreeMap::new();
    for (key, raw) in store.scan_prefix(&prefix)? {
        let fragment = &key[prefix.len()..];
        if let Some(reading) = decode(&key, &raw) {
            out.insert(ArchiveId::parse(fragment), reading);
        }
    }
    Ok(out)
}
