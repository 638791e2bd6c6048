//! Storage schema and key layout.
//!
//! Every persisted value lives in one flat key/value keyspace. The SQLite
//! backend keeps it in a single table whose primary key doubles as the
//! prefix index used for per-user enumeration.

pub const KV_DB_NAME: &str = "lectio.db";

pub const KV_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    ) WITHOUT ROWID
";

// --- Key layout ---

/// Global pointer to the active identity.
pub const CURRENT_USER_KEY: &str = "currentUser";

pub const LAST_COMPLETED_DAY_KEY: &str = "lastCompletedDay";
pub const MEDITATION_STATUS_KEY: &str = "meditation-status";
pub const ARCHIVED_READING_PREFIX: &str = "archived-reading-";

pub const DIARY_ENTRIES_KEY: &str = "diary-entries";
pub const MISSION_PLANS_KEY: &str = "mission-plans";

/// Marker shared by every transient content cache generation.
pub const CONTENT_CACHE_MARKER: &str = "reading-content-v";
pub const CONTENT_CACHE_VERSION: u32 = 9;

/// localStorage-sized default budget.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
