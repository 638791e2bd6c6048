use crate::core::error;
use crate::core::namespace::{UserId, namespaced_key};
use crate::core::schemas::MEDITATION_STATUS_KEY;
use crate::core::store::Store;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a day's meditation went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeditationStatus {
    Good,
    Ok,
    Bad,
}

impl MeditationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeditationStatus::Good => "good",
            MeditationStatus::Ok => "ok",
            MeditationStatus::Bad => "bad",
        }
    }
}

impl fmt::Display for MeditationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeditationStatus {
    type Err = error::LectioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(MeditationStatus::Good),
            "ok" => Ok(MeditationStatus::Ok),
            "bad" => Ok(MeditationStatus::Bad),
            other => Err(error::LectioError::ValidationError(format!(
                "unknown status '{other}' (expected good, ok or bad)"
            ))),
        }
    }
}

/// Day → status. Absent days have no status.
pub type MeditationRecord = BTreeMap<u32, MeditationStatus>;

pub fn status_key(user: Option<&UserId>) -> String {
    namespaced_key(user, MEDITATION_STATUS_KEY)
}

pub fn get_all(store: &Store, user: Option<&UserId>) -> Result<MeditationRecord, error::LectioError> {
    let Some(raw) = store.get(&status_key(user))? else {
        return Ok(MeditationRecord::new());
    };
    match serde_json::from_str(&raw) {
        Ok(record) => Ok(record),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable meditation status ledger, treating as empty");
            Ok(MeditationRecord::new())
        }
    }
}

pub fn save_all(
    store: &Store,
    user: Option<&UserId>,
    record: &MeditationRecord,
) -> Result<(), error::LectioError> {
    store.set(&status_key(user), &serde_json::to_string(record)?)
}

/// Mark `day` with `status`, or clear it when it already has that status.
/// Returns the day's status after the call.
pub fn toggle(
    store: &Store,
    user: Option<&UserId>,
    day: u32,
    status: MeditationStatus,
) -> Result<Option<MeditationStatus>, error::LectioError> {
    let mut record = get_all(store, user)?;
    let result = if record.get(&day) == Some(&status) {
        record.remove(&day);
        None
    } else {
        record.insert(day, status);
        Some(status)
    };
    save_all(store, user, &record)?;
    Ok(result)
}
