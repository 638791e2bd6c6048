//! Dashboard figures derived from the status ledger and the archive.

use crate::core::curriculum::{Curriculum, Locale};
use crate::core::error;
use crate::core::namespace::UserId;
use crate::core::store::Store;
use crate::plugins::archive::{self, ArchiveId, ArchivedReading};
use crate::plugins::status::{self, MeditationStatus};
use serde::Serialize;
use std::fmt;

/// Growth stage shown on the dashboard, by archived reading count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityLevel {
    Seed,
    Sprout,
    Branch,
    Fruit,
}

impl IdentityLevel {
    pub fn for_archived(total: usize) -> Self {
        match total {
            0..5 => IdentityLevel::Seed,
            5..15 => IdentityLevel::Sprout,
            15..30 => IdentityLevel::Branch,
            _ => IdentityLevel::Fruit,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (IdentityLevel::Seed, Locale::Ko) => "씨앗",
            (IdentityLevel::Sprout, Locale::Ko) => "새싹",
            (IdentityLevel::Branch, Locale::Ko) => "가지",
            (IdentityLevel::Fruit, Locale::Ko) => "열매",
            (IdentityLevel::Seed, Locale::En) => "Seed",
            (IdentityLevel::Sprout, Locale::En) => "Sprout",
            (IdentityLevel::Branch, Locale::En) => "Branch",
            (IdentityLevel::Fruit, Locale::En) => "Fruit",
        }
    }
}

impl fmt::Display for IdentityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Locale::En))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub id: String,
    #[serde(flatten)]
    pub reading: ArchivedReading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookProgress {
    pub name: String,
    /// Archived readings whose reference mentions this book.
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub good: usize,
    pub ok: usize,
    pub bad: usize,
    pub archived: usize,
    pub completion_rate: u32,
    pub level: IdentityLevel,
    /// Newest first.
    pub history: Vec<HistoryItem>,
    pub books: Vec<BookProgress>,
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

pub fn summarize(
    store: &Store,
    user: Option<&UserId>,
    curriculum: &Curriculum,
    locale: Locale,
) -> Result<DashboardStats, error::LectioError> {
    let record = status::get_all(store, user)?;
    let count = |wanted: MeditationStatus| record.values().filter(|s| **s == wanted).count();
    let (good, ok, bad) = (
        count(MeditationStatus::Good),
        count(MeditationStatus::Ok),
        count(MeditationStatus::Bad),
    );

    let archived = archive::list_all(store, user)?;
    let books = curriculum
        .entries()
        .iter()
        .map(|entry| {
            let name = entry.name.get(locale);
            let count = archived
                .values()
                .filter(|r| r.reading_reference.contains(name))
                .count();
            let possible = entry.chapters.div_ceil(2) as usize;
            BookProgress {
                name: name.to_string(),
                count,
                percent: percent(count, possible).min(100),
            }
        })
        .collect();

    let mut history: Vec<HistoryItem> = archived
        .iter()
        .map(|(id, reading): (&ArchiveId, &ArchivedReading)| HistoryItem {
            id: id.to_string(),
            reading: reading.clone(),
        })
        .collect();
    // Unparseable timestamps sort last.
    history.sort_by(|a, b| b.reading.saved_at().cmp(&a.reading.saved_at()));

    Ok(DashboardStats {
        good,
        ok,
        bad,
        archived: archived.len(),
        completion_rate: percent(good + ok + bad, curriculum.total_days() as usize),
        level: IdentityLevel::for_archived(archived.len()),
        history,
        books,
    })
}
