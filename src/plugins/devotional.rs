//! Finishing a day's reading.
//!
//! Completion touches three independent keys (archive, status ledger,
//! progress) with no transaction around them. If the process dies between
//! writes the archive can exist without the matching status or progress;
//! nothing here detects or repairs that.

use crate::core::error;
use crate::core::namespace::UserId;
use crate::core::store::Store;
use crate::core::time;
use crate::plugins::archive::{self, ArchiveId, ArchivedReading, NON_SEQUENTIAL_DAY};
use crate::plugins::content::ContentBundle;
use crate::plugins::progress;
use crate::plugins::status::{self, MeditationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingMode {
    /// Day `n` of the plan.
    Sequential(u32),
    /// A free selection outside the plan.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedReading {
    pub mode: ReadingMode,
    pub reference: String,
    pub content: ContentBundle,
}

impl CompletedReading {
    pub fn archive_id(&self) -> ArchiveId {
        match self.mode {
            ReadingMode::Sequential(day) => ArchiveId::Day(day),
            ReadingMode::Manual => ArchiveId::manual_for_reference(&self.reference),
        }
    }

    fn to_archived(&self) -> ArchivedReading {
        ArchivedReading {
            day: match self.mode {
                ReadingMode::Sequential(day) => i64::from(day),
                ReadingMode::Manual => NON_SEQUENTIAL_DAY,
            },
            date_saved: time::now_iso(),
            reading_reference: self.reference.clone(),
            passage: self.content.passage.clone(),
            meditation_guide: self.content.meditation_guide.clone(),
            context: self.content.context.clone(),
            intention: self.content.intention.clone(),
            context_image_url: self.content.image.clone(),
        }
    }
}

/// Archive the reading and, for plan days, mark the day `good`.
///
/// A reading without a passage or meditation guide is rejected before
/// anything is written.
pub fn complete_reading(
    store: &Store,
    user: Option<&UserId>,
    completed: &CompletedReading,
) -> Result<ArchiveId, error::LectioError> {
    if completed.content.passage.trim().is_empty()
        || completed.content.meditation_guide.trim().is_empty()
    {
        return Err(error::LectioError::ValidationError(format!(
            "cannot complete '{}' without a passage and meditation guide",
            completed.reference
        )));
    }
    let id = completed.archive_id();
    archive::put(store, user, &id, &completed.to_archived())?;

    if let ReadingMode::Sequential(day) = completed.mode {
        let current = status::get_all(store, user)?.get(&day).copied();
        if current != Some(MeditationStatus::Good) {
            status::toggle(store, user, day, MeditationStatus::Good)?;
        }
    }
    tracing::info!(id = %id, reference = %completed.reference, "reading completed");
    Ok(id)
}

/// Move past `completed_day`; returns the next day to read.
pub fn proceed(store: &Store, user: &UserId, completed_day: u32) -> Result<u32, error::LectioError> {
    progress::advance(store, user, completed_day)?;
    progress::next_day(store, user)
}
