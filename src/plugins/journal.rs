//! Per-user journals: free-form lists stored as one JSON array per key.

use crate::core::error;
use crate::core::namespace::{UserId, namespaced_key};
use crate::core::schemas::{DIARY_ENTRIES_KEY, MISSION_PLANS_KEY};
use crate::core::store::Store;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Journal {
    Diary,
    MissionPlans,
}

impl Journal {
    pub fn raw_key(&self) -> &'static str {
        match self {
            Journal::Diary => DIARY_ENTRIES_KEY,
            Journal::MissionPlans => MISSION_PLANS_KEY,
        }
    }

    pub fn key(&self, user: Option<&UserId>) -> String {
        namespaced_key(user, self.raw_key())
    }
}

/// Entries of `journal`; missing or unreadable lists read as empty.
pub fn load<T: DeserializeOwned>(
    store: &Store,
    user: Option<&UserId>,
    journal: Journal,
) -> Result<Vec<T>, error::LectioError> {
    let key = journal.key(user);
    let Some(raw) = store.get(&key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "unreadable journal, treating as empty");
            Ok(Vec::new())
        }
    }
}

/// Replace the whole list.
pub fn save<T: Serialize>(
    store: &Store,
    user: Option<&UserId>,
    journal: Journal,
    entries: &[T],
) -> Result<(), error::LectioError> {
    store.set(&journal.key(user), &serde_json::to_string(entries)?)
}
