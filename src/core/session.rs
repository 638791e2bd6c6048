//! The persisted "current user" pointer.
//!
//! Only login/logout touch it. Storage calls receive the identity as an
//! argument; this module is how the CLI and service find out which one.

use crate::core::error::LectioError;
use crate::core::namespace::UserId;
use crate::core::schemas::CURRENT_USER_KEY;
use crate::core::store::Store;

pub fn login(store: &Store, username: &str) -> Result<UserId, LectioError> {
    let user = UserId::new(username)?;
    store.set(CURRENT_USER_KEY, user.as_str())?;
    tracing::info!(user = %user, "logged in");
    Ok(user)
}

pub fn logout(store: &Store) -> Result<(), LectioError> {
    store.remove(CURRENT_USER_KEY)?;
    tracing::info!("logged out");
    Ok(())
}

/// The active identity, if any. A pointer that no longer validates (e.g.
/// written by a raw restore) reads as "nobody".
pub fn current_user(store: &Store) -> Result<Option<UserId>, LectioError> {
    let Some(raw) = store.get(CURRENT_USER_KEY)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match UserId::new(&raw) {
        Ok(user) => Ok(Some(user)),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unusable current user pointer");
            Ok(None)
        }
    }
}
