//! Shared test fixtures for the linkcards test suite.
//!
//! Provides sample generator inputs, store rows in the JSON shape the REST
//! backend returns, and an in-memory [`GenerationStore`] for exercising the
//! session layer without HTTP.

use crate::cards::CardInput;
use crate::config::StoreConfig;
use crate::store::{GenerationStore, StoreError, matches_query};
use crate::types::{GenerationRecord, NewGeneration, SourceKind};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Mutex;

// =========================================================================
// Inputs
// =========================================================================

/// Two YouTube cards with titles and descriptions and no image links.
pub fn sample_input() -> CardInput {
    CardInput {
        video_links: "https://youtu.be/XYZ789\nhttps://www.youtube.com/watch?v=ABC123".into(),
        image_links: String::new(),
        titles: "Intro\nDeep dive".into(),
        descriptions: "Start here\nMore detail".into(),
        video_type: SourceKind::Youtube,
        image_type: SourceKind::Youtube,
    }
}

pub fn sample_new_generation() -> NewGeneration {
    NewGeneration {
        video_type: SourceKind::Googledrive,
        image_type: SourceKind::Googledrive,
        video_links: vec!["https://drive.google.com/file/d/VID1/view".into()],
        image_links: vec!["https://drive.google.com/open?id=IMG1".into()],
        titles: vec!["Launch".into()],
        descriptions: vec!["Product walkthrough".into()],
        generated_html: "<div class=\"card\"></div>\n<!-- Card 1 -->".into(),
    }
}

// =========================================================================
// Store rows
// =========================================================================

pub fn test_store_config(url: &str) -> StoreConfig {
    StoreConfig {
        url: url.to_string(),
        key: "test-key".to_string(),
        ..StoreConfig::default()
    }
}

/// A stored row as the backend returns it.
pub fn record_json(id: &str, titles: &[&str], descriptions: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "video_type": "youtube",
        "image_type": "youtube",
        "video_links": titles.iter().map(|_| "https://youtu.be/abc").collect::<Vec<_>>(),
        "image_links": [],
        "titles": titles,
        "descriptions": descriptions,
        "generated_html": "<div class=\"card\"></div>",
        "created_at": "2025-05-04T08:30:00+00:00"
    })
}

/// The row the backend would return after inserting `generation`.
pub fn record_json_from(generation: &NewGeneration, id: &str) -> serde_json::Value {
    let mut row = serde_json::to_value(generation).unwrap();
    row["id"] = json!(id);
    row["created_at"] = json!("2025-05-04T08:30:00+00:00");
    row
}

pub fn record_with(id: &str, titles: &[&str], descriptions: &[&str]) -> GenerationRecord {
    serde_json::from_value(record_json(id, titles, descriptions)).unwrap()
}

// =========================================================================
// In-memory store
// =========================================================================

/// Keeps records in insertion order and assigns sequential ids.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<GenerationRecord>>,
    fail_saves: bool,
}

impl MemoryStore {
    /// A store whose `save` always fails.
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn save(&self, generation: &NewGeneration) -> Result<GenerationRecord, StoreError> {
        if self.fail_saves {
            return Err(StoreError::Api {
                status: 500,
                message: "insert failed".into(),
            });
        }
        let mut records = self.records.lock().unwrap();
        let seq = records.len() as i64 + 1;
        let record = GenerationRecord {
            id: seq.to_string(),
            video_type: generation.video_type,
            image_type: generation.image_type,
            video_links: generation.video_links.clone(),
            image_links: generation.image_links.clone(),
            titles: generation.titles.clone(),
            descriptions: generation.descriptions.clone(),
            generated_html: generation.generated_html.clone(),
            created_at: Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<GenerationRecord, StoreError> {
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GenerationRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| matches_query(r, query))
            .take(limit)
            .cloned()
            .collect())
    }
}
