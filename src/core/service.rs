//! Async facade over the storage operations.
//!
//! Every call performs the synchronous store operation and then waits out a
//! fixed simulated round-trip, so callers are written against the latency a
//! remote backend would have. Reads degrade to defaults with a warning;
//! writes return their error.

use crate::core::config::LectioConfig;
use crate::core::curriculum::{Curriculum, Locale};
use crate::core::error::LectioError;
use crate::core::namespace::UserId;
use crate::core::schedule::DailyReading;
use crate::core::session;
use crate::core::store::Store;
use crate::plugins::archive::{self, ArchiveId, ArchivedReading};
use crate::plugins::backup::{self, RestoreReport};
use crate::plugins::content::{self, ContentBundle, ContentGenerator, ImageGenerator};
use crate::plugins::devotional::{self, CompletedReading};
use crate::plugins::journal::{self, Journal};
use crate::plugins::progress;
use crate::plugins::stats::{self, DashboardStats};
use crate::plugins::status::{self, MeditationRecord, MeditationStatus};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LectioService {
    store: Store,
    latency: Duration,
}

fn or_default<T: Default>(op: &str, result: Result<T, LectioError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(op, error = %e, "read failed, using default");
        T::default()
    })
}

impl LectioService {
    pub fn new(store: Store, latency: Duration) -> Self {
        Self { store, latency }
    }

    pub fn from_config(config: &LectioConfig) -> Result<Self, LectioError> {
        Ok(Self::new(Store::open(&config.storage)?, config.service.latency()))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    async fn settle<T>(&self, value: T) -> T {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        value
    }

    // --- Session ---

    pub async fn login(&self, username: &str) -> Result<UserId, LectioError> {
        self.settle(session::login(&self.store, username)).await
    }

    pub async fn logout(&self) -> Result<(), LectioError> {
        self.settle(session::logout(&self.store)).await
    }

    pub async fn current_user(&self) -> Option<UserId> {
        self.settle(or_default("current_user", session::current_user(&self.store)))
            .await
    }

    // --- Progress ---

    pub async fn progress(&self, user: &UserId) -> u32 {
        self.settle(or_default("progress", progress::get_progress(&self.store, user)))
            .await
    }

    pub async fn advance(&self, user: &UserId, completed_day: u32) -> Result<bool, LectioError> {
        self.settle(progress::advance(&self.store, user, completed_day))
            .await
    }

    // --- Status ledger ---

    pub async fn statuses(&self, user: Option<&UserId>) -> MeditationRecord {
        self.settle(or_default("statuses", status::get_all(&self.store, user)))
            .await
    }

    pub async fn toggle_status(
        &self,
        user: Option<&UserId>,
        day: u32,
        value: MeditationStatus,
    ) -> Result<Option<MeditationStatus>, LectioError> {
        self.settle(status::toggle(&self.store, user, day, value))
            .await
    }

    // --- Archive ---

    pub async fn archive(&self, user: Option<&UserId>) -> BTreeMap<ArchiveId, ArchivedReading> {
        self.settle(or_default("archive", archive::list_all(&self.store, user)))
            .await
    }

    pub async fn archive_reading(
        &self,
        user: Option<&UserId>,
        id: &ArchiveId,
        reading: &ArchivedReading,
    ) -> Result<(), LectioError> {
        self.settle(archive::put(&self.store, user, id, reading))
            .await
    }

    // --- Journals ---

    pub async fn journal<T: DeserializeOwned + Send>(
        &self,
        user: Option<&UserId>,
        kind: Journal,
    ) -> Vec<T> {
        self.settle(or_default("journal", journal::load(&self.store, user, kind)))
            .await
    }

    pub async fn save_journal<T: Serialize + Sync>(
        &self,
        user: Option<&UserId>,
        kind: Journal,
        entries: &[T],
    ) -> Result<(), LectioError> {
        self.settle(journal::save(&self.store, user, kind, entries))
            .await
    }

    // --- Backup ---

    pub async fn backup(&self, user: &UserId) -> Result<String, LectioError> {
        self.settle(backup::backup(&self.store, user)).await
    }

    /// Boolean outcome of a restore; details are logged.
    pub async fn restore(&self, user: &UserId, document: &str) -> bool {
        let outcome: Result<RestoreReport, LectioError> =
            backup::restore(&self.store, user, document);
        let ok = match outcome {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(user = %user, error = %e, "restore failed");
                false
            }
        };
        self.settle(ok).await
    }

    // --- Reading flow ---

    pub async fn load_content(
        &self,
        generator: &dyn ContentGenerator,
        images: Option<&dyn ImageGenerator>,
        reading: &DailyReading,
        locale: Locale,
    ) -> Result<ContentBundle, LectioError> {
        content::load(&self.store, generator, images, reading, locale).await
    }

    pub async fn complete_reading(
        &self,
        user: Option<&UserId>,
        completed: &CompletedReading,
    ) -> Result<ArchiveId, LectioError> {
        self.settle(devotional::complete_reading(&self.store, user, completed))
            .await
    }

    pub async fn proceed(&self, user: &UserId, completed_day: u32) -> Result<u32, LectioError> {
        self.settle(devotional::proceed(&self.store, user, completed_day))
            .await
    }

    pub async fn dashboard(
        &self,
        user: Option<&UserId>,
        curriculum: &Curriculum,
        locale: Locale,
    ) -> Result<DashboardStats, LectioError> {
        self.settle(stats::summarize(&self.store, user, curriculum, locale))
            .await
    }
}
