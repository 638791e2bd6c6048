//! The reading curriculum and its flattened chapter sequence.
//!
//! The curriculum is an ordered table of books with chapter counts. Order is
//! significant: the plan reads every chapter of the first book, then moves on
//! to the next, so the flattened sequence is the single source of truth for
//! which two chapters a given day covers (see [`crate::core::schedule`]).

use crate::core::error::LectioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Display language for book names and references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }

    /// Marker written immediately after a chapter number.
    pub fn chapter_suffix(&self) -> &'static str {
        match self {
            Locale::Ko => "장",
            Locale::En => "",
        }
    }

    /// Joins the two segments of a cross-book reference.
    pub fn separator(&self) -> &'static str {
        ", "
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = LectioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ko" => Ok(Locale::Ko),
            "en" => Ok(Locale::En),
            other => Err(LectioError::ValidationError(format!(
                "unknown locale '{other}' (expected 'ko' or 'en')"
            ))),
        }
    }
}

/// A book name in every supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalizedName {
    pub ko: &'static str,
    pub en: &'static str,
}

impl LocalizedName {
    pub const fn new(ko: &'static str, en: &'static str) -> Self {
        Self { ko, en }
    }

    pub fn get(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Ko => self.ko,
            Locale::En => self.en,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurriculumEntry {
    pub name: LocalizedName,
    pub chapters: u32,
}

impl CurriculumEntry {
    pub const fn new(ko: &'static str, en: &'static str, chapters: u32) -> Self {
        Self {
            name: LocalizedName::new(ko, en),
            chapters,
        }
    }
}

/// Pauline epistles, Galatians first (days 1–3), then Romans from day 4.
pub const PAULINE_EPISTLES: [CurriculumEntry; 13] = [
    CurriculumEntry::new("갈라디아서", "Galatians", 6),
    CurriculumEntry::new("로마서", "Romans", 16),
    CurriculumEntry::new("고린도전서", "1 Corinthians", 16),
    CurriculumEntry::new("고린도후서", "2 Corinthians", 13),
    CurriculumEntry::new("에베소서", "Ephesians", 6),
    CurriculumEntry::new("빌립보서", "Philippians", 4),
    CurriculumEntry::new("골로새서", "Colossians", 4),
    CurriculumEntry::new("데살로니가전서", "1 Thessalonians", 5),
    CurriculumEntry::new("데살로니가후서", "2 Thessalonians", 3),
    CurriculumEntry::new("디모데전서", "1 Timothy", 6),
    CurriculumEntry::new("디모데후서", "2 Timothy", 4),
    CurriculumEntry::new("디도서", "Titus", 3),
    CurriculumEntry::new("빌레몬서", "Philemon", 1),
];

/// One chapter of one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChapterUnit {
    pub name: LocalizedName,
    pub chapter: u32,
}

/// An ordered curriculum together with its flattened chapter sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    entries: Vec<CurriculumEntry>,
    units: Vec<ChapterUnit>,
}

static PAULINE: LazyLock<Curriculum> = LazyLock::new(|| Curriculum {
    entries: PAULINE_EPISTLES.to_vec(),
    units: expand(&PAULINE_EPISTLES),
});

fn expand(entries: &[CurriculumEntry]) -> Vec<ChapterUnit> {
    entries
        .iter()
        .flat_map(|entry| {
            (1..=entry.chapters).map(move |chapter| ChapterUnit {
                name: entry.name,
                chapter,
            })
        })
        .collect()
}

impl Curriculum {
    /// Build a curriculum from a custom table.
    pub fn new(entries: Vec<CurriculumEntry>) -> Result<Self, LectioError> {
        if entries.is_empty() {
            return Err(LectioError::ValidationError(
                "curriculum must contain at least one book".to_string(),
            ));
        }
        if let Some(empty) = entries.iter().find(|e| e.chapters == 0) {
            return Err(LectioError::ValidationError(format!(
                "book '{}' has no chapters",
                empty.name.en
            )));
        }
        let units = expand(&entries);
        Ok(Self { entries, units })
    }

    /// The built-in Pauline plan, expanded once per process.
    pub fn pauline() -> &'static Curriculum {
        &PAULINE
    }

    pub fn entries(&self) -> &[CurriculumEntry] {
        &self.entries
    }

    pub fn units(&self) -> &[ChapterUnit] {
        &self.units
    }

    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    /// Days needed to cover every chapter once at two chapters a day.
    pub fn total_days(&self) -> u32 {
        self.units.len().div_ceil(2) as u32
    }
}
