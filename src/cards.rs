//! Card generation.
//!
//! Takes the four line-delimited inputs (video links, image links, titles,
//! descriptions), zips them by line index and renders one HTML card per
//! video link. The same index-aligned sequences become the
//! [`NewGeneration`] record that the store persists.
//!
//! ## Line Alignment
//!
//! ```text
//! videos        images        titles     descriptions
//! youtu.be/a    (empty)       Intro      Start here      → card 1
//! (blank, dropped)
//! youtu.be/b    thumb-b.jpg   Deep dive  (empty)         → card 2
//! ```
//!
//! Blank lines are dropped from the video links only, so the number of
//! cards is the number of non-empty video lines. Image, title and
//! description lines keep their blanks as empty placeholders; alignment is
//! by position, never by filtering. Lines past the end of a shorter list
//! read as empty strings.
//!
//! ## Output
//!
//! Each card is followed by a `<!-- Card N -->` marker and cards are
//! concatenated in input order. Titles and descriptions are escaped by
//! maud unless `generator.escape_text` is turned off, which reproduces
//! raw interpolation of element text for users who paste markup on purpose.
//! Attribute values are always escaped.

use crate::config::{GeneratorConfig, Theme};
use crate::links;
use crate::types::{NewGeneration, SourceKind};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fmt;
use thiserror::Error;

/// One of the four generator inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    VideoLinks,
    ImageLinks,
    Titles,
    Descriptions,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::VideoLinks => "video links",
            Field::ImageLinks => "image links",
            Field::Titles => "titles",
            Field::Descriptions => "descriptions",
        })
    }
}

/// Required inputs were empty. Lists every offending field so all of them
/// can be reported at once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill in all required fields: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<Field>,
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(Field::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw generator input: four newline-delimited texts and the two kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardInput {
    pub video_links: String,
    pub image_links: String,
    pub titles: String,
    pub descriptions: String,
    pub video_type: SourceKind,
    pub image_type: SourceKind,
}

impl CardInput {
    /// Check required fields without generating anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();
        if self.video_links.trim().is_empty() {
            fields.push(Field::VideoLinks);
        }
        if self.image_type.requires_image_link() && self.image_links.trim().is_empty() {
            fields.push(Field::ImageLinks);
        }
        if self.titles.trim().is_empty() {
            fields.push(Field::Titles);
        }
        if self.descriptions.trim().is_empty() {
            fields.push(Field::Descriptions);
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}

/// Split a text area into trimmed lines, keeping blank lines.
fn split_lines(text: &str) -> Vec<String> {
    text.trim().split('\n').map(|l| l.trim().to_string()).collect()
}

/// A single card after link normalization, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub video_url: String,
    pub image_url: String,
    pub title: String,
    pub description: String,
}

/// The result of a successful generation: the rendered HTML, the
/// normalized cards, and the record to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub html: String,
    pub cards: Vec<Card>,
    pub record: NewGeneration,
}

/// Validate, normalize and render all cards.
///
/// Either every card renders or nothing does: validation runs first and
/// rendering itself cannot fail.
pub fn generate(input: &CardInput, config: &GeneratorConfig) -> Result<Generation, ValidationError> {
    input.validate()?;

    let video_links: Vec<String> = split_lines(&input.video_links)
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect();
    let image_links = split_lines(&input.image_links);
    let titles = split_lines(&input.titles);
    let descriptions = split_lines(&input.descriptions);

    let at = |lines: &[String], i: usize| lines.get(i).cloned().unwrap_or_default();

    let cards: Vec<Card> = video_links
        .iter()
        .enumerate()
        .map(|(i, video)| Card {
            video_url: links::normalize_video(video, input.video_type),
            image_url: links::resolve_image(&at(&image_links, i), video, input.image_type),
            title: at(&titles, i),
            description: at(&descriptions, i),
        })
        .collect();

    let mut html = String::new();
    for (i, card) in cards.iter().enumerate() {
        html.push_str(&render_card(card, config).into_string());
        html.push_str(&format!("\n<!-- Card {} -->\n\n", i + 1));
    }
    let html = html.trim().to_string();

    tracing::debug!(cards = cards.len(), bytes = html.len(), "generated cards");

    Ok(Generation {
        record: NewGeneration {
            video_type: input.video_type,
            image_type: input.image_type,
            video_links,
            image_links,
            titles,
            descriptions,
            generated_html: html.clone(),
        },
        html,
        cards,
    })
}

/// Element text, escaped unless raw interpolation is configured.
fn text(value: &str, escape: bool) -> Markup {
    if escape {
        html! { (value) }
    } else {
        PreEscaped(value.to_string())
    }
}

/// Renders one card fragment.
pub fn render_card(card: &Card, config: &GeneratorConfig) -> Markup {
    let body_style = format!(
        "color:{}; padding:0; margin:0; text-align:center;",
        config.accent_color
    );
    html! {
        div.card data-video=(card.video_url) {
            img.thumb alt=(card.title) src=(card.image_url);
            div.card-title {
                p style="text-align:center; margin:0; padding:0;" { (text(&card.title, config.escape_text)) }
            }
            div.card-body style=(body_style) {
                strong { (text(&card.description, config.escape_text)) }
            }
        }
    }
}

// ============================================================================
// Preview document
// ============================================================================

const PREVIEW_CSS: &str = include_str!("../static/preview.css");
const PREVIEW_JS: &str = include_str!("../static/preview.js");

/// Wraps card HTML (freshly generated or loaded from the store) in a
/// standalone page. Clicking a card opens its `data-video` URL.
pub fn render_preview(cards_html: &str, theme: Theme, title: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(PREVIEW_CSS)) }
            }
            body class=(theme.as_str()) {
                main.preview-container {
                    (PreEscaped(cards_html))
                }
                script { (PreEscaped(PREVIEW_JS)) }
            }
        }
    }
}
