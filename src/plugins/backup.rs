use crate::core::error;
use crate::core::namespace::UserId;
use crate::core::schemas::CURRENT_USER_KEY;
use crate::core::store::Store;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub user: UserId,
    /// Keys written verbatim from the document.
    pub restored: usize,
    /// Entries whose value was not a string.
    pub skipped: usize,
}

/// Every key in `user`'s namespace plus the identity pointer, as one flat
/// pretty-printed JSON object.
pub fn backup(store: &Store, user: &UserId) -> Result<String, error::LectioError> {
    let mut document: BTreeMap<String, String> =
        store.scan_prefix(&user.key_prefix())?.into_iter().collect();
    document.insert(CURRENT_USER_KEY.to_string(), user.as_str().to_string());
    tracing::info!(user = %user, keys = document.len(), "backup created");
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Replay a backup document into the keyspace and make `user` current.
///
/// The document is fully parsed before anything is written; a malformed one
/// leaves the store untouched. Keys are written as-is, including keys of
/// other namespaces. Only the final identity pointer is forced to `user`.
/// Writes are not transactional: a storage failure mid-replay leaves the
/// keys written so far in place and the pointer unchanged.
pub fn restore(store: &Store, user: &UserId, document: &str) -> Result<RestoreReport, error::LectioError> {
    let parsed: serde_json::Value = serde_json::from_str(document)
        .map_err(|e| error::LectioError::MalformedBackup(e.to_string()))?;
    let serde_json::Value::Object(map) = parsed else {
        return Err(error::LectioError::MalformedBackup(
            "expected a JSON object of key/value pairs".to_string(),
        ));
    };

    let mut entries = Vec::with_capacity(map.len());
    let mut skipped = 0usize;
    for (key, value) in map {
        match value {
            serde_json::Value::String(value) => entries.push((key, value)),
            _ => {
                tracing::warn!(key = %key, "skipping non-string backup value");
                skipped += 1;
            }
        }
    }

    for (key, value) in &entries {
        store.set(key, value)?;
    }
    store.set(CURRENT_USER_KEY, user.as_str())?;

    tracing::info!(user = %user, restored = entries.len(), skipped, "backup restored");
    Ok(RestoreReport {
        user: user.clone(),
        restored: entries.len(),
        skipped,
    })
}
