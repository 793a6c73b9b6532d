//! Link normalization for YouTube and Google Drive.
//!
//! Users paste whatever link their browser shows: share links, watch pages,
//! Drive "open" links or a bare Drive file id. Each platform has an ordered
//! table of extraction rules; the first rule that captures an identifier
//! wins. The identifier is then rewritten into the URL a card can actually
//! embed or display.
//!
//! | Input | Kind | Output |
//! |-------|------|--------|
//! | `https://youtu.be/XYZ` | video | `https://www.youtube.com/embed/XYZ?showinfo=0` |
//! | `https://drive.google.com/file/d/ABC/view` | video | `https://drive.google.com/file/d/ABC/preview` |
//! | `https://drive.google.com/open?id=ABC` | image | `https://drive.google.com/thumbnail?id=ABC` |
//! | *(empty)*, video `https://youtu.be/XYZ` | image | `https://img.youtube.com/vi/XYZ/hqdefault.jpg` |
//!
//! Normalization never fails. A link no rule recognizes is returned as-is,
//! so a card still renders with whatever the user typed.

use crate::types::SourceKind;
use regex::Regex;
use std::sync::LazyLock;

/// One extraction rule: a name for diagnostics and a pattern whose first
/// capture group is the identifier.
struct Rule {
    name: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid link pattern"),
        }
    }

    fn extract<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

static DRIVE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("file path", r"drive\.google\.com/file/d/([a-zA-Z0-9_-]+)"),
        Rule::new("open link", r"drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)"),
        Rule::new("id parameter", r"[?&]id=([a-zA-Z0-9_-]+)"),
        Rule::new("bare id", r"^([a-zA-Z0-9_-]{25,})$"),
    ]
});

static YOUTUBE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("watch page", r"youtube\.com/watch\?v=([a-zA-Z0-9_-]+)"),
        Rule::new("short link", r"youtu\.be/([a-zA-Z0-9_-]+)"),
        Rule::new("embed link", r"youtube\.com/embed/([a-zA-Z0-9_-]+)"),
    ]
});

fn first_match<'a>(rules: &[Rule], url: &'a str) -> Option<&'a str> {
    rules.iter().find_map(|rule| {
        let id = rule.extract(url)?;
        tracing::trace!(rule = rule.name, id, "link rule matched");
        Some(id)
    })
}

/// Extract a Google Drive file id from a share link or a bare id.
pub fn google_drive_id(url: &str) -> Option<&str> {
    first_match(&DRIVE_RULES, url)
}

/// Extract a YouTube video id from a watch, short or embed link.
pub fn youtube_id(url: &str) -> Option<&str> {
    first_match(&YOUTUBE_RULES, url)
}

/// Rewrite a video link into its embeddable form.
pub fn normalize_video(url: &str, kind: SourceKind) -> String {
    let rewritten = match kind {
        SourceKind::Youtube => {
            youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{id}?showinfo=0"))
        }
        SourceKind::Googledrive => {
            google_drive_id(url).map(|id| format!("https://drive.google.com/file/d/{id}/preview"))
        }
        SourceKind::Direct => None,
    };
    rewritten.unwrap_or_else(|| url.to_string())
}

/// Resolve the thumbnail for one card.
///
/// `image` is the user-supplied image link (possibly empty) and `video` the
/// raw, un-normalized video link of the same card. An empty image with a
/// YouTube image type borrows the video's thumbnail.
pub fn resolve_image(image: &str, video: &str, kind: SourceKind) -> String {
    let image = image.trim();
    match kind {
        SourceKind::Youtube if image.is_empty() => youtube_id(video)
            .map(|id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
            .unwrap_or_default(),
        SourceKind::Googledrive if !image.is_empty() => google_drive_id(image)
            .map(|id| format!("https://drive.google.com/thumbnail?id={id}"))
            .unwrap_or_else(|| image.to_string()),
        _ => image.to_string(),
    }
}
