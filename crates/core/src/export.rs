//! Plain-text transcript export.
//!
//! Each message becomes `ROLE: content` followed by a blank line. Files are
//! named `chat_YYYYMMDD_HHMMSS.txt` after the local time of the export.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::{Error, Result};
use crate::message::Message;

/// Render history in the export format.
pub fn render_transcript(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}\n\n", m.role.as_str().to_uppercase(), m.content))
        .collect()
}

/// Timestamped export filename.
pub fn export_filename(at: NaiveDateTime) -> String {
    format!("chat_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Write `history` into a new file under `dir` and return its path.
pub fn write_transcript(dir: &Path, history: &[Message]) -> Result<PathBuf> {
    if history.is_empty() {
        return Err(Error::Export("conversation is empty, nothing to export".into()));
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(Local::now().naive_local()));
    std::fs::write(&path, render_transcript(history))?;

    tracing::info!(path = %path.display(), messages = history.len(), "Transcript exported");
    Ok(path)
}
