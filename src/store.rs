//! Generation store: persistence for generated card sets.
//!
//! Generations live in one table of a hosted PostgREST service (Supabase
//! exposes the same API). [`GenerationStore`] is the seam the rest of the
//! crate talks to; [`RestStore`] is the HTTP implementation.
//!
//! Every operation except a paged search is one round trip. There is no
//! cache, no local mirror and no retry: a failure surfaces to the caller
//! immediately, and the caller decides how to report it.
//!
//! ## Search
//!
//! The backend can only match text patterns against the serialized array
//! columns, which also matches across element boundaries and JSON
//! punctuation. [`RestStore::search`] uses that as a coarse pre-filter and
//! then keeps only records where a single title or description contains the
//! query ([`matches_query`]). The row limit can only apply after that
//! refinement, so coarse matches are fetched a page at a time until enough
//! records survive or the table runs out.

use crate::config::StoreConfig;
use crate::types::{GenerationRecord, NewGeneration};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Row limit used when the caller does not pick one.
pub const DEFAULT_LIMIT: usize = 10;

/// Smallest page of coarse matches fetched per search round trip.
const SEARCH_PAGE: usize = 50;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store is not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generation {id} not found")]
    NotFound { id: String },

    #[error("Invalid store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Create, read, search and delete generations.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Insert one generation. The store assigns `id` and `created_at`.
    async fn save(&self, generation: &NewGeneration) -> Result<GenerationRecord, StoreError>;

    /// Up to `limit` generations, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, StoreError>;

    /// One generation by id; [`StoreError::NotFound`] if no row matches.
    async fn get_by_id(&self, id: &str) -> Result<GenerationRecord, StoreError>;

    /// Delete one generation by id.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Up to `limit` generations whose titles or descriptions contain
    /// `query`, case-insensitively, newest first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GenerationRecord>, StoreError>;
}

/// Whether any single title or description contains `query`, ignoring case.
pub fn matches_query(record: &GenerationRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    record
        .titles
        .iter()
        .chain(record.descriptions.iter())
        .any(|text| text.to_lowercase().contains(&needle))
}

/// Build the quoted PostgREST `ilike` operand for a search query.
///
/// `%` and `_` are matched literally. `"` and `\` are stored backslash-escaped
/// in the serialized columns, so each becomes a `%` wildcard; the per-element
/// refinement drops anything that wildcard lets through. Quoting keeps commas
/// and parentheses from breaking the `or=(...)` list.
fn ilike_operand(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    for c in query.chars() {
        match c {
            '%' | '_' => {
                pattern.push('\\');
                pattern.push(c);
            }
            '"' | '\\' => pattern.push('%'),
            _ => pattern.push(c),
        }
    }
    let quoted = pattern.replace('\\', "\\\\");
    format!("\"*{quoted}*\"")
}

// ============================================================================
// PostgREST implementation
// ============================================================================

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

/// Generation store backed by a PostgREST table.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    endpoint: String,
    key: String,
}

impl RestStore {
    /// Build a client from config. Fails with [`StoreError::NotConfigured`]
    /// when the URL or key is missing or the URL is not http(s).
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config.url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(StoreError::NotConfigured(format!(
                "set {} to the store URL",
                crate::config::STORE_URL_ENV
            )));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(StoreError::NotConfigured(format!(
                "store URL must start with http:// or https://, got {url}"
            )));
        }
        if config.key.trim().is_empty() {
            return Err(StoreError::NotConfigured(format!(
                "set {} to the store access key",
                crate::config::STORE_KEY_ENV
            )));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{url}/rest/v1/{}", config.table),
            key: config.key.trim().to_string(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn fetch_rows(&self, query: &[(&str, String)]) -> Result<Vec<GenerationRecord>, StoreError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;
        decode_rows(check(response).await?).await
    }
}

/// Turn a non-success response into [`StoreError::Api`] with the backend's
/// message.
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .map(|e| match e.details {
            Some(details) if !details.is_empty() => format!("{} ({details})", e.message),
            _ => e.message,
        })
        .unwrap_or(body);

    tracing::error!(status = status.as_u16(), message = %message, "store request failed");

    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode_rows(response: Response) -> Result<Vec<GenerationRecord>, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl GenerationStore for RestStore {
    async fn save(&self, generation: &NewGeneration) -> Result<GenerationRecord, StoreError> {
        tracing::debug!(cards = generation.video_links.len(), "saving generation");
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&[generation])
            .send()
            .await?;
        let record = decode_rows(check(response).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no rows".into()))?;
        tracing::info!(id = %record.id, "generation saved");
        Ok(record)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, StoreError> {
        tracing::debug!(limit, "listing recent generations");
        self.fetch_rows(&[
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ])
        .await
    }

    async fn get_by_id(&self, id: &str) -> Result<GenerationRecord, StoreError> {
        tracing::debug!(id, "fetching generation");
        self.fetch_rows(&[("id", format!("eq.{id}")), ("limit", "1".to_string())])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        tracing::debug!(id, "deleting generation");
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GenerationRecord>, StoreError> {
        tracing::debug!(query, limit, "searching generations");
        let operand = ilike_operand(query.trim());
        let filter = format!("(titles::text.ilike.{operand},descriptions::text.ilike.{operand})");
        let page = limit.max(SEARCH_PAGE);

        let mut found = Vec::new();
        let mut offset = 0;
        while found.len() < limit {
            let rows = self
                .fetch_rows(&[
                    ("or", filter.clone()),
                    ("order", "created_at.desc,id.desc".to_string()),
                    ("limit", page.to_string()),
                    ("offset", offset.to_string()),
                ])
                .await?;
            let fetched = rows.len();
            found.extend(rows.into_iter().filter(|r| matches_query(r, query)));
            if fetched < page {
                break;
            }
            offset += page;
        }
        found.truncate(limit);
        Ok(found)
    }
}
