use crate::core::error;
use crate::core::namespace::{UserId, namespaced_key};
use crate::core::schemas::LAST_COMPLETED_DAY_KEY;
use crate::core::store::Store;

pub fn progress_key(user: &UserId) -> String {
    namespaced_key(Some(user), LAST_COMPLETED_DAY_KEY)
}

/// Highest completed day, 0 when nothing has been completed. An unreadable
/// value is treated as 0.
pub fn get_progress(store: &Store, user: &UserId) -> Result<u32, error::LectioError> {
    let Some(raw) = store.get(&progress_key(user))? else {
        return Ok(0);
    };
    match raw.trim().parse::<u32>() {
        Ok(day) => Ok(day),
        Err(e) => {
            tracing::warn!(user = %user, value = %raw, error = %e, "unreadable progress value, using 0");
            Ok(0)
        }
    }
}

/// Record `completed_day` if it is beyond the stored value. Returns whether
/// anything was written; duplicate or out-of-order signals are no-ops.
pub fn advance(store: &Store, user: &UserId, completed_day: u32) -> Result<bool, error::LectioError> {
    let current = get_progress(store, user)?;
    if completed_day <= current {
        return Ok(false);
    }
    store.set(&progress_key(user), &completed_day.to_string())?;
    tracing::debug!(user = %user, from = current, to = completed_day, "progress advanced");
    Ok(true)
}

/// The day the user should read next.
pub fn next_day(store: &Store, user: &UserId) -> Result<u32, error::LectioError> {
    Ok(get_progress(store, user)?.saturating_add(1))
}
