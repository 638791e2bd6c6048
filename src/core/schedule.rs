//! Day scheduler: day index → two chapters, plus reference formatting.
//!
//! Day `n` covers flattened units `2(n-1)` and `2(n-1)+1`, both taken modulo
//! the unit count, so the plan never terminates; it wraps to the first
//! chapter of the first book. Everything here is a pure function of its
//! arguments and the curriculum table.

use crate::core::curriculum::{ChapterUnit, Curriculum, Locale};
use crate::core::error::LectioError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterRef {
    pub book: String,
    pub chapter: u32,
}

impl ChapterRef {
    fn from_unit(unit: &ChapterUnit, locale: Locale) -> Self {
        Self {
            book: unit.name.get(locale).to_string(),
            chapter: unit.chapter,
        }
    }
}

/// One day's assignment: always exactly two chapters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyReading(pub [ChapterRef; 2]);

impl DailyReading {
    pub fn first(&self) -> &ChapterRef {
        &self.0[0]
    }

    pub fn second(&self) -> &ChapterRef {
        &self.0[1]
    }

    pub fn reference(&self, locale: Locale) -> String {
        format_reference(self, locale)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub day: u32,
    pub reading: String,
}

/// Render a reading as display text, e.g. `Galatians 1-2`,
/// `갈라디아서 6장, 로마서 1장`.
pub fn format_reference(reading: &DailyReading, locale: Locale) -> String {
    let (a, b) = (reading.first(), reading.second());
    let suffix = locale.chapter_suffix();
    if a.book == b.book {
        format!("{} {}-{}{}", a.book, a.chapter, b.chapter, suffix)
    } else {
        format!(
            "{} {}{}{}{} {}{}",
            a.book,
            a.chapter,
            suffix,
            locale.separator(),
            b.book,
            b.chapter,
            suffix
        )
    }
}

/// Key-safe form of a reference: every character that is not a letter or
/// digit is dropped. Hangul counts as letters, so Korean references keep
/// their book names.
pub fn reference_key(reference: &str) -> String {
    reference.chars().filter(|c| c.is_alphanumeric()).collect()
}

impl Curriculum {
    /// The two chapters assigned to `day`. Days below 1 behave as day 1.
    pub fn reading_for_day(&self, day: i64, locale: Locale) -> DailyReading {
        let units = self.units();
        let total = units.len() as i64;
        let safe_day = day.max(1);
        // Reduce before doubling so huge day numbers cannot overflow.
        let start = (((safe_day - 1) % total) * 2) % total;
        let first = &units[start as usize];
        let second = &units[((start + 1) % total) as usize];
        DailyReading([
            ChapterRef::from_unit(first, locale),
            ChapterRef::from_unit(second, locale),
        ])
    }

    /// Table of contents for one pass over the curriculum.
    pub fn full_schedule(&self, locale: Locale) -> Vec<ScheduleItem> {
        (1..=self.total_days())
            .map(|day| ScheduleItem {
                day,
                reading: format_reference(&self.reading_for_day(i64::from(day), locale), locale),
            })
            .collect()
    }

    /// Free selection outside the sequential plan: `start_chapter` of the
    /// book at `book_index` and the chapter after it. Past the end of a book
    /// the second chapter is the next book's first; on the final book the
    /// start chapter is repeated.
    pub fn manual_reading(
        &self,
        book_index: usize,
        start_chapter: u32,
        locale: Locale,
    ) -> Result<DailyReading, LectioError> {
        let entries = self.entries();
        let book = entries.get(book_index).ok_or_else(|| {
            LectioError::ValidationError(format!(
                "book index {book_index} out of range (0..{})",
                entries.len()
            ))
        })?;
        if start_chapter == 0 || start_chapter > book.chapters {
            return Err(LectioError::ValidationError(format!(
                "{} has chapters 1..={}, got {start_chapter}",
                book.name.get(locale),
                book.chapters
            )));
        }

        let first = ChapterRef {
            book: book.name.get(locale).to_string(),
            chapter: start_chapter,
        };
        let second = if start_chapter < book.chapters {
            ChapterRef {
                book: first.book.clone(),
                chapter: start_chapter + 1,
            }
        } else if let Some(next) = entries.get(book_index + 1) {
            ChapterRef {
                book: next.name.get(locale).to_string(),
                chapter: 1,
            }
        } else {
            first.clone()
        };
        Ok(DailyReading([first, second]))
    }
}
