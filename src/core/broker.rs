use crate::core::db;
use crate::core::error;
use crate::core::time;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// The DB Broker is the single entry point for SQLite access.
/// It serializes connections in-process and traces every operation.
#[derive(Debug, Clone)]
pub struct DbBroker {
    actor: String,
}

impl DbBroker {
    pub fn new(actor: &str) -> Self {
        Self {
            actor: actor.to_string(),
        }
    }

    /// Execute a closure with a serialized connection to the specified DB.
    pub fn with_conn<F, R>(&self, db_path: &Path, op_name: &str, f: F) -> Result<R, error::LectioError>
    where
        F: FnOnce(&Connection) -> Result<R, error::LectioError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&db_path.to_string_lossy())?;

        let result = f(&conn);

        let status = match &result {
            Ok(_) => "success",
            Err(e) if e.is_quota_exceeded() => "quota_exceeded",
            Err(_) => "error",
        };
        self.log_event(op_name, &db_id, status);

        result
    }

    fn log_event(&self, op: &str, db_id: &str, status: &str) {
        tracing::debug!(
            target: "lectio::broker",
            event_id = %time::new_event_id(),
            actor = %self.actor,
            op,
            db_id,
            status,
            "broker op"
        );
    }
}
