//! Shared types for generations, used by the card generator, the store and
//! the CLI.
//!
//! Field names follow the `card_generations` table columns so a record
//! serializes directly into the row the store inserts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform a link comes from.
///
/// Decides how a video or image link is normalized. Anything that is not a
/// known platform is `Direct` and passes through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Youtube,
    #[serde(alias = "google")]
    #[value(alias = "google")]
    Googledrive,
    #[serde(other)]
    Direct,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Youtube => "youtube",
            SourceKind::Googledrive => "googledrive",
            SourceKind::Direct => "direct",
        }
    }

    /// Whether an image link must be supplied when this is the image type.
    ///
    /// Only Google Drive images need an explicit link; YouTube thumbnails are
    /// derived from the video and direct images are optional.
    pub fn requires_image_link(self) -> bool {
        self == SourceKind::Googledrive
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => SourceKind::Youtube,
            "googledrive" | "google" => SourceKind::Googledrive,
            _ => SourceKind::Direct,
        })
    }
}

/// A generation before it has been persisted.
///
/// The sequences are index-aligned: element `i` of each describes card `i`.
/// `video_links` has exactly one entry per card; the others may be shorter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGeneration {
    pub video_type: SourceKind,
    pub image_type: SourceKind,
    pub video_links: Vec<String>,
    pub image_links: Vec<String>,
    pub titles: Vec<String>,
    pub descriptions: Vec<String>,
    /// Rendered cards. A cache of the fields above, trusted on load.
    pub generated_html: String,
}

/// A generation as stored, with the id and timestamp the store assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub video_type: SourceKind,
    pub image_type: SourceKind,
    #[serde(deserialize_with = "string_list")]
    pub video_links: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub image_links: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub titles: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub generated_html: String,
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Number of cards shown in listings, one per stored title.
    pub fn card_count(&self) -> usize {
        self.titles.len()
    }
}

/// Accept either a string or a numeric id; the store decides the column type.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Array columns come back either as JSON arrays or, from older rows, as a
/// JSON-encoded string holding the array. Null reads as empty.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum List {
        Items(Vec<String>),
        Encoded(String),
    }

    match Option::<List>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(List::Items(items)) => Ok(items),
        Some(List::Encoded(text)) if text.trim().is_empty() => Ok(Vec::new()),
        Some(List::Encoded(text)) => {
            serde_json::from_str(&text).map_err(serde::de::Error::custom)
        }
    }
}
