//! Copying generated HTML to the clipboard.
//!
//! The system clipboard is tried first. Over SSH or on a headless session it
//! is usually unavailable, so the fallback asks the terminal to set its
//! clipboard with an OSC 52 escape sequence. Most modern terminal emulators
//! honor it; the fallback only fails when there is no terminal to write to.
//!
//! On X11 and Wayland the clipboard is owned by the process that set it. The
//! handle is dropped as soon as the text is set, so without a clipboard
//! manager to take over ownership the copied text disappears when `linkcards`
//! exits. Desktop sessions normally run one; bare window managers may not.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{IsTerminal, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Nothing to copy")]
    Empty,
    #[error("Failed to copy HTML code: {primary}; terminal fallback: {fallback}")]
    Unavailable { primary: String, fallback: String },
}

/// How the text reached the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    System,
    Terminal,
}

/// Copy `text` verbatim.
pub fn copy_html(text: &str) -> Result<CopyMethod, ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::Empty);
    }

    let primary = match arboard::Clipboard::new().and_then(|mut c| c.set_text(text.to_string())) {
        Ok(()) => return Ok(CopyMethod::System),
        Err(e) => e.to_string(),
    };
    tracing::warn!(error = %primary, "system clipboard failed, trying terminal fallback");

    let stdout = std::io::stdout();
    if !stdout.is_terminal() {
        return Err(ClipboardError::Unavailable {
            primary,
            fallback: "stdout is not a terminal".into(),
        });
    }
    let mut out = stdout.lock();
    out.write_all(osc52_sequence(text).as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| ClipboardError::Unavailable {
            primary,
            fallback: e.to_string(),
        })?;
    Ok(CopyMethod::Terminal)
}

/// OSC 52 "set clipboard" sequence, BEL-terminated.
fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
