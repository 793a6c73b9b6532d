//! # linkcards
//!
//! Turns pasted lists of video links, image links, titles and descriptions
//! into HTML "cards", and keeps every generation in a hosted table so it can
//! be listed, searched, reloaded and regenerated later.
//!
//! # Pipeline
//!
//! ```text
//! 1. Normalize  raw links   →  embed / preview / thumbnail URLs
//! 2. Generate   four lists  →  card HTML + generation record
//! 3. Persist    record      →  card_generations table (auto-save)
//! ```
//!
//! Stages 1 and 2 are pure functions of their input and the config, so
//! they are tested without any network. Stage 3 is the only side effect and
//! sits behind the [`store::GenerationStore`] trait.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`links`] | YouTube / Google Drive id extraction and URL rewriting |
//! | [`cards`] | Input validation, line alignment, card and preview rendering with Maud |
//! | [`store`] | `GenerationStore` trait and the PostgREST implementation |
//! | [`session`] | Auto-save dispatch, notices, loading records back into input shape |
//! | [`clipboard`] | Copying HTML, with an OSC 52 terminal fallback |
//! | [`config`] | `linkcards.toml` loading, merging, validation, env credentials |
//! | [`types`] | `SourceKind`, `NewGeneration`, `GenerationRecord` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Escaped By Default
//!
//! Titles and descriptions are user text. Maud escapes every interpolation,
//! so a stray `<` in a title cannot break the surrounding page. Raw element
//! text is still available through `generator.escape_text = false`.
//!
//! ## Lenient Links, Strict Inputs
//!
//! A link that no rule recognizes is passed through unchanged rather than
//! rejected; the card still renders and the user sees what they typed.
//! Missing required lists, on the other hand, reject the whole request
//! before anything renders.
//!
//! ## The Store Is Optional For Generating
//!
//! Missing credentials only fail store operations. `generate` still writes
//! its HTML and reports the failed auto-save as a notice.

pub mod cards;
pub mod clipboard;
pub mod config;
pub mod links;
pub mod output;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
