//! Terminal rendering helpers for the CLI.

use crate::plugins::status::MeditationStatus;
use colored::{ColoredString, Colorize};

/// Collapse whitespace and cut to `max_chars`, marking the cut with `...`.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

pub fn status_mark(status: Option<MeditationStatus>) -> ColoredString {
    match status {
        Some(MeditationStatus::Good) => "good".green().bold(),
        Some(MeditationStatus::Ok) => " ok ".yellow(),
        Some(MeditationStatus::Bad) => "bad ".red(),
        None => "  · ".dimmed(),
    }
}

/// Fixed-width bar for a 0..=100 percentage.
pub fn percent_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width).div_ceil(100);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
