//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every listed generation leads with what a person recognizes (its titles)
//! and keeps the identifiers needed to act on it (`load`, `delete`) as
//! indented context lines:
//!
//! ```text
//! 001 Intro, Deep dive...
//!     [youtube] [youtube]  2025-05-04 10:30
//!     Cards: 3 items
//!     Id: 7f1c2a
//! ```
//!
//! Generated cards are shown the same way:
//!
//! ```text
//! 001 Intro
//!     Video: https://www.youtube.com/embed/XYZ789?showinfo=0
//!     Image: https://img.youtube.com/vi/XYZ789/hqdefault.jpg
//!
//! Generated 2 cards
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function is pure and returns `Vec<String>` for
//! testability; the `print_*` wrappers write to stdout (notices go to
//! stderr so piping the HTML stays clean).

use crate::cards::Card;
use crate::session::{Notice, NoticeLevel};
use crate::types::GenerationRecord;
use chrono::Local;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// First two titles joined, with `...` when more exist.
fn titles_preview(titles: &[String]) -> String {
    let mut preview = titles
        .iter()
        .take(2)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if titles.len() > 2 {
        preview.push_str("...");
    }
    preview
}

// ============================================================================
// History and search
// ============================================================================

/// Format one stored generation as a header line plus context lines.
pub fn format_history_item(index: usize, record: &GenerationRecord) -> Vec<String> {
    let created = record
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let preview = titles_preview(&record.titles);
    let header = if preview.is_empty() {
        format!("{} (untitled)", format_index(index))
    } else {
        format!("{} {}", format_index(index), preview)
    };
    vec![
        header,
        format!(
            "{}[{}] [{}]  {}",
            indent(1),
            record.video_type,
            record.image_type,
            created
        ),
        format!("{}Cards: {} items", indent(1), record.card_count()),
        format!("{}Id: {}", indent(1), record.id),
    ]
}

/// Format a list of generations; `empty` is shown when there are none.
pub fn format_records(records: &[GenerationRecord], empty: &str) -> Vec<String> {
    if records.is_empty() {
        return vec![empty.to_string()];
    }
    records
        .iter()
        .enumerate()
        .flat_map(|(i, record)| format_history_item(i + 1, record))
        .collect()
}

pub fn print_history(records: &[GenerationRecord]) {
    for line in format_records(records, "No generations found") {
        println!("{}", line);
    }
}

pub fn print_search_results(records: &[GenerationRecord]) {
    for line in format_records(records, "No results found") {
        println!("{}", line);
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Format the normalized cards of a generation.
pub fn format_cards(cards: &[Card]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, card) in cards.iter().enumerate() {
        if card.title.is_empty() {
            lines.push(format!("{} (untitled)", format_index(i + 1)));
        } else {
            lines.push(format!("{} {}", format_index(i + 1), card.title));
        }
        lines.push(format!("{}Video: {}", indent(1), card.video_url));
        if !card.image_url.is_empty() {
            lines.push(format!("{}Image: {}", indent(1), card.image_url));
        }
    }
    lines.push(String::new());
    let noun = if cards.len() == 1 { "card" } else { "cards" };
    lines.push(format!("Generated {} {}", cards.len(), noun));
    lines
}

pub fn print_cards(cards: &[Card]) {
    for line in format_cards(cards) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Notices
// ============================================================================

pub fn format_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Error => "✗",
        NoticeLevel::Info => "•",
    };
    format!("{} {}", marker, notice.message)
}

pub fn print_notice(notice: &Notice) {
    eprintln!("{}", format_notice(notice));
}
