//! Configuration loading.
//!
//! Settings come from an optional `linkcards.toml`, merged key-by-key on top
//! of the stock defaults, plus two environment variables holding the store
//! credentials. Credentials live in the environment so the config file can
//! be committed alongside card inputs.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [store]
//! url = ""                    # Overridden by LINKCARDS_STORE_URL
//! key = ""                    # Overridden by LINKCARDS_STORE_KEY
//! table = "card_generations"
//! # timeout_secs = 30         # Omit to rely on the transport's own timeouts
//!
//! [generator]
//! video_type = "youtube"      # youtube | googledrive | direct
//! image_type = "youtube"
//! escape_text = true          # Escape titles/descriptions inside cards
//! accent_color = "#23cbe4"    # Description text color
//!
//! [history]
//! limit = 20                  # Rows shown by `history` and `search`
//!
//! [preview]
//! theme = "dark"              # light | dark
//! ```
//!
//! Unknown keys are rejected to catch typos early. Missing or invalid store
//! credentials are not a config error: generation still works, and every
//! store operation reports `NotConfigured` instead.

use crate::types::SourceKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the store endpoint URL.
pub const STORE_URL_ENV: &str = "LINKCARDS_STORE_URL";
/// Environment variable holding the store access key.
pub const STORE_KEY_ENV: &str = "LINKCARDS_STORE_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `linkcards.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Remote generation store.
    pub store: StoreConfig,
    /// Defaults and rendering options for card generation.
    pub generator: GeneratorConfig,
    /// History and search listings.
    pub history: HistoryConfig,
    /// Standalone preview page.
    pub preview: PreviewConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.limit == 0 {
            return Err(ConfigError::Validation(
                "history.limit must be at least 1".into(),
            ));
        }
        let table = &self.store.table;
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Validation(
                "store.table must be a plain table name".into(),
            ));
        }
        if !is_hex_color(&self.generator.accent_color) {
            return Err(ConfigError::Validation(
                "generator.accent_color must be a hex color like #23cbe4".into(),
            ));
        }
        Ok(())
    }

    /// Override store credentials from the environment.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(STORE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.url = url.trim().to_string();
        }
        if let Some(key) = lookup(STORE_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.key = key.trim().to_string();
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Remote store connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the hosted project, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Access key sent as both `apikey` and bearer token.
    pub key: String,
    /// Table holding generations.
    pub table: String,
    /// Request timeout. When absent, the transport's own behavior applies.
    pub timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: "card_generations".to_string(),
            timeout_secs: None,
        }
    }
}

/// Card generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Video kind used when `--video-type` is not given.
    #[serde(deserialize_with = "known_kind")]
    pub video_type: SourceKind,
    /// Image kind used when `--image-type` is not given.
    #[serde(deserialize_with = "known_kind")]
    pub image_type: SourceKind,
    /// Escape titles and descriptions inside card elements.
    pub escape_text: bool,
    /// Description text color.
    pub accent_color: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            video_type: SourceKind::Youtube,
            image_type: SourceKind::Youtube,
            escape_text: true,
            accent_color: "#23cbe4".to_string(),
        }
    }
}

/// Stored rows fall back to `direct` for unknown kinds; a config value must
/// name one the CLI accepts, so a typo is reported instead of silently
/// disabling link normalization.
fn known_kind<'de, D>(deserializer: D) -> Result<SourceKind, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    <SourceKind as clap::ValueEnum>::from_str(name.trim(), true).map_err(|_| {
        serde::de::Error::custom(format!(
            "unknown link kind `{name}`, expected youtube, googledrive or direct"
        ))
    })
}

/// History listing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Maximum rows fetched by `history` and `search`.
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { limit: 20 }
    }
}

/// Color theme of the preview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Preview page settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub theme: Theme,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, then apply the store credentials from the
/// process environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = resolve_config(stock_defaults_value(), load_raw_config(path)?)?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

/// Returns a fully-commented stock `linkcards.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# linkcards configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Generation store
# ---------------------------------------------------------------------------
[store]
# Base URL of the hosted project. LINKCARDS_STORE_URL takes precedence.
url = ""

# Access key. LINKCARDS_STORE_KEY takes precedence; prefer the environment.
key = ""

# Table holding generations.
table = "card_generations"

# Request timeout in seconds. Omit to rely on the transport's own timeouts.
# timeout_secs = 30

# ---------------------------------------------------------------------------
# Card generation
# ---------------------------------------------------------------------------
[generator]
# Default link kinds: youtube | googledrive | direct
video_type = "youtube"
image_type = "youtube"

# Escape titles and descriptions. Set to false to paste raw markup.
escape_text = true

# Description text color.
accent_color = "#23cbe4"

# ---------------------------------------------------------------------------
# History and search
# ---------------------------------------------------------------------------
[history]
limit = 20

# ---------------------------------------------------------------------------
# Preview page
# ---------------------------------------------------------------------------
[preview]
# light | dark
theme = "dark"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.store.table, "card_generations");
        assert_eq!(config.store.timeout_secs, None);
        assert_eq!(config.generator.video_type, SourceKind::Youtube);
        assert!(config.generator.escape_text);
        assert_eq!(config.history.limit, 20);
        assert_eq!(config.preview.theme, Theme::Dark);
    }

    #[test]
    fn parse_partial_config() {
        let config: AppConfig = toml::from_str(
            r##"
[generator]
image_type = "googledrive"
"##,
        )
        .unwrap();
        assert_eq!(config.generator.image_type, SourceKind::Googledrive);
        assert_eq!(config.generator.accent_color, "#23cbe4");
        assert_eq!(config.history.limit, 20);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = resolve_config(
            stock_defaults_value(),
            load_raw_config(&tmp.path().join("linkcards.toml")).unwrap(),
        )
        .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("linkcards.toml");
        fs::write(
            &path,
            r##"
[store]
url = "https://example.supabase.co"
timeout_secs = 15

[preview]
theme = "light"
"##,
        )
        .unwrap();

        let config = resolve_config(stock_defaults_value(), load_raw_config(&path).unwrap()).unwrap();
        assert_eq!(config.store.url, "https://example.supabase.co");
        assert_eq!(config.store.timeout_secs, Some(15));
        assert_eq!(config.store.table, "card_generations");
        assert_eq!(config.preview.theme, Theme::Light);
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("linkcards.toml");
        fs::write(&path, "[store\nurl = ").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn misspelled_link_kind_rejected() {
        let overlay: toml::Value = toml::from_str("[generator]\nvideo_type = \"yotube\"\n").unwrap();
        let err = resolve_config(stock_defaults_value(), Some(overlay)).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("yotube"));
    }

    #[test]
    fn link_kind_accepts_google_alias_and_direct() {
        let config: AppConfig =
            toml::from_str("[generator]\nvideo_type = \"direct\"\nimage_type = \"google\"\n").unwrap();
        assert_eq!(config.generator.video_type, SourceKind::Direct);
        assert_eq!(config.generator.image_type, SourceKind::Googledrive);
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[generator]\nescape = false\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let overlay: toml::Value = toml::from_str("[colors]\nbg = \"#fff\"\n").unwrap();
        assert!(resolve_config(stock_defaults_value(), Some(overlay)).is_err());
    }

    #[test]
    fn validate_rejects_zero_limit() {
        let mut config = AppConfig::default();
        config.history.limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_odd_table_name() {
        let mut config = AppConfig::default();
        config.store.table = "card_generations?select=*".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accent_color() {
        let mut config = AppConfig::default();
        config.generator.accent_color = "#fff".into();
        assert!(config.validate().is_ok());
        config.generator.accent_color = "red; background:url(x)".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_store_credentials() {
        let env: HashMap<&str, &str> = HashMap::from([
            (STORE_URL_ENV, " https://env.supabase.co "),
            (STORE_KEY_ENV, "anon-key"),
        ]);
        let mut config = AppConfig::default();
        config.store.url = "https://file.supabase.co".into();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.store.url, "https://env.supabase.co");
        assert_eq!(config.store.key, "anon-key");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.store.key = "from-file".into();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.store.key, "from-file");
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: AppConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
