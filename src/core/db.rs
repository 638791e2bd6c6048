use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use crate::core::store::{KeyValueStore, check_quota, entry_bytes, prefix_upper_bound};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::LectioError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::LectioError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::LectioError::RusqliteError)?;
    Ok(conn)
}

pub fn kv_db_path(root: &Path) -> PathBuf {
    root.join(schemas::KV_DB_NAME)
}

pub fn initialize_kv_db(db_path: &Path) -> Result<(), error::LectioError> {
    if let Some(parent_dir) = db_path.parent()
        && !parent_dir.as_os_str().is_empty()
    {
        fs::create_dir_all(parent_dir).map_err(error::LectioError::IoError)?;
    }

    let broker = DbBroker::new("lectio");
    broker.with_conn(db_path, "kv.init", |conn| {
        conn.execute(schemas::KV_DB_SCHEMA, [])?;
        Ok(())
    })?;

    tracing::debug!(path = %db_path.display(), "key/value database ready");
    Ok(())
}

/// SQLite-backed keyspace. Each call opens a connection through the broker.
#[derive(Debug)]
pub struct SqliteKv {
    path: PathBuf,
    quota_bytes: Option<u64>,
    broker: DbBroker,
}

impl SqliteKv {
    pub fn open(path: &Path, quota_bytes: Option<u64>) -> Result<Self, error::LectioError> {
        initialize_kv_db(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            quota_bytes,
            broker: DbBroker::new("lectio"),
        })
    }
}

const USAGE_SQL: &str =
    "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) FROM kv";

fn usage(conn: &Connection) -> Result<u64, error::LectioError> {
    let total: i64 = conn.query_row(USAGE_SQL, [], |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or(0))
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, error::LectioError> {
        self.broker.with_conn(&self.path, "kv.get", |conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), error::LectioError> {
        self.broker.with_conn(&self.path, "kv.set", |conn| {
            let tx = conn.unchecked_transaction()?;
            if self.quota_bytes.is_some() {
                let current = usage(&tx)?;
                let replaced: Option<String> = tx
                    .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                        row.get(0)
                    })
                    .optional()?;
                let replaced = replaced.map(|v| entry_bytes(key, &v)).unwrap_or(0);
                check_quota(self.quota_bytes, current, replaced, entry_bytes(key, value))?;
            }
            tx.execute(
                "INSERT INTO kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), error::LectioError> {
        self.broker.with_conn(&self.path, "kv.remove", |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, error::LectioError> {
        self.broker.with_conn(&self.path, "kv.scan", |conn| {
            let mut out = Vec::new();
            // Range over the primary key so the scan is an index seek.
            match prefix_upper_bound(prefix) {
                Some(upper) => {
                    let mut stmt = conn.prepare(
                        "SELECT key, value FROM kv WHERE key >= ?1 AND key < ?2 ORDER BY key",
                    )?;
                    let rows = stmt.query_map(params![prefix, upper], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?;
                    for r in rows {
                        out.push(r?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare("SELECT key, value FROM kv ORDER BY key")?;
                    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                    for r in rows {
                        out.push(r?);
                    }
                }
            }
            Ok(out)
        })
    }

    fn len(&self) -> Result<usize, error::LectioError> {
        self.broker.with_conn(&self.path, "kv.len", |conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        })
    }

    fn usage_bytes(&self) -> Result<u64, error::LectioError> {
        self.broker.with_conn(&self.path, "kv.usage", usage)
    }

    fn clear(&self) -> Result<(), error::LectioError> {
        self.broker.with_conn(&self.path, "kv.clear", |conn| {
            conn.execute("DELETE FROM kv", [])?;
            Ok(())
        })
    }
}
