//! The user-facing actions around a generation.
//!
//! There is no ambient "current generation": the [`Generation`] value a
//! command produced (or loaded) is passed explicitly to whatever saves,
//! copies or previews it.
//!
//! Auto-save after generation is fire-and-forget from the caller's point of
//! view. [`dispatch_save`] spawns the store call and reports the outcome as a
//! [`Notice`] on a channel, so the caller can keep writing outputs. The
//! returned [`AutoSave`] is only awaited when the process wants the outcome
//! before exiting.
//!
//! ## Input Directory Layout
//!
//! A loaded generation can be written back to disk in the shape the
//! generator reads, edited, and regenerated:
//!
//! ```text
//! my-cards/
//! ├── videos.txt          # one link per line
//! ├── images.txt
//! ├── titles.txt
//! ├── descriptions.txt
//! ├── kinds.toml          # video_type / image_type
//! └── cards.html          # stored HTML, as saved
//! ```
//!
//! [`Generation`]: crate::cards::Generation

use crate::cards::CardInput;
use crate::store::{GenerationStore, StoreError};
use crate::types::{GenerationRecord, NewGeneration, SourceKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const VIDEOS_FILE: &str = "videos.txt";
pub const IMAGES_FILE: &str = "images.txt";
pub const TITLES_FILE: &str = "titles.txt";
pub const DESCRIPTIONS_FILE: &str = "descriptions.txt";
pub const KINDS_FILE: &str = "kinds.toml";
pub const HTML_FILE: &str = "cards.html";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please enter a search term")]
    EmptyQuery,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid kinds.toml: {0}")]
    KindsParse(#[from] toml::de::Error),
    #[error("Could not write kinds.toml: {0}")]
    KindsWrite(#[from] toml::ser::Error),
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A one-line outcome report for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

// ============================================================================
// Auto-save
// ============================================================================

/// Handle to a dispatched save.
pub struct AutoSave {
    handle: JoinHandle<Option<GenerationRecord>>,
}

impl AutoSave {
    /// Wait for the save to finish. `None` if it failed; the failure has
    /// already been reported as a notice.
    pub async fn finish(self) -> Option<GenerationRecord> {
        self.handle.await.ok().flatten()
    }
}

/// Persist `record` in the background and report the outcome on `notices`.
pub fn dispatch_save(
    store: Arc<dyn GenerationStore>,
    record: NewGeneration,
    notices: mpsc::UnboundedSender<Notice>,
) -> AutoSave {
    let handle = tokio::spawn(async move {
        match store.save(&record).await {
            Ok(saved) => {
                let _ = notices.send(Notice::success(format!(
                    "Generation auto-saved successfully! (id {})",
                    saved.id
                )));
                Some(saved)
            }
            Err(e) => {
                tracing::error!(error = %e, "auto-save failed");
                let _ = notices.send(Notice::error(format!("Failed to save generation: {e}")));
                None
            }
        }
    });
    AutoSave { handle }
}

// ============================================================================
// History, search, load
// ============================================================================

pub async fn history(
    store: &dyn GenerationStore,
    limit: usize,
) -> Result<Vec<GenerationRecord>, SessionError> {
    Ok(store.list_recent(limit).await?)
}

/// Search titles and descriptions. An empty query is rejected without a
/// remote call.
pub async fn search(
    store: &dyn GenerationStore,
    query: &str,
    limit: usize,
) -> Result<Vec<GenerationRecord>, SessionError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SessionError::EmptyQuery);
    }
    Ok(store.search(query, limit).await?)
}

/// A stored generation mapped back into generator input shape.
///
/// The stored HTML is trusted as-is; it is not re-rendered from the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedGeneration {
    pub record: GenerationRecord,
    pub input: CardInput,
}

impl LoadedGeneration {
    pub fn from_record(record: GenerationRecord) -> Self {
        let input = CardInput {
            video_links: record.video_links.join("\n"),
            image_links: record.image_links.join("\n"),
            titles: record.titles.join("\n"),
            descriptions: record.descriptions.join("\n"),
            video_type: record.video_type,
            image_type: record.image_type,
        };
        Self { record, input }
    }

    pub fn html(&self) -> &str {
        &self.record.generated_html
    }

    /// Write the inputs, kinds and stored HTML into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), SessionError> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(VIDEOS_FILE), with_newline(&self.input.video_links))?;
        fs::write(dir.join(IMAGES_FILE), with_newline(&self.input.image_links))?;
        fs::write(dir.join(TITLES_FILE), with_newline(&self.input.titles))?;
        fs::write(dir.join(DESCRIPTIONS_FILE), with_newline(&self.input.descriptions))?;
        let kinds = Kinds {
            video_type: Some(self.input.video_type),
            image_type: Some(self.input.image_type),
        };
        fs::write(dir.join(KINDS_FILE), toml::to_string(&kinds)?)?;
        fs::write(dir.join(HTML_FILE), with_newline(self.html()))?;
        Ok(())
    }
}

pub async fn load(store: &dyn GenerationStore, id: &str) -> Result<LoadedGeneration, SessionError> {
    let record = store.get_by_id(id.trim()).await?;
    Ok(LoadedGeneration::from_record(record))
}

fn with_newline(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Kinds {
    video_type: Option<SourceKind>,
    image_type: Option<SourceKind>,
}

/// Read generator input from a directory in the layout [`LoadedGeneration::write_to`]
/// produces. Missing text files read as empty; kinds missing from
/// `kinds.toml` (or a missing file) fall back to the given defaults.
pub fn read_input_dir(
    dir: &Path,
    video_default: SourceKind,
    image_default: SourceKind,
) -> Result<CardInput, SessionError> {
    let read = |name: &str| -> Result<String, SessionError> {
        let path = dir.join(name);
        if path.exists() {
            Ok(fs::read_to_string(path)?)
        } else {
            Ok(String::new())
        }
    };

    let kinds: Kinds = match read(KINDS_FILE)? {
        text if text.trim().is_empty() => Kinds::default(),
        text => toml::from_str(&text)?,
    };

    Ok(CardInput {
        video_links: read(VIDEOS_FILE)?,
        image_links: read(IMAGES_FILE)?,
        titles: read(TITLES_FILE)?,
        descriptions: read(DESCRIPTIONS_FILE)?,
        video_type: kinds.video_type.unwrap_or(video_default),
        image_type: kinds.image_type.unwrap_or(image_default),
    })
}
