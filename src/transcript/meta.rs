//! Sidecar metadata for shared transcripts.
//!
//! A shared `<name>.jsonl` is accompanied by `<name>.meta.json` describing
//! what was exported and carrying a hash of the transcript text.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transcript::file::{DecodeReport, atomic_write};
use crate::transcript::hash::content_hash;
use crate::transcript::types::Message;

/// Format tag written into every sidecar.
pub const FORMAT: &str = "tshare-transcript/1";

/// Contents of a `.meta.json` sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareMetadata {
    pub format: String,
    /// Stream id of the first message.
    pub stream_id: String,
    pub message_count: usize,
    /// Lines the decoder dropped while reading the source transcript.
    pub skipped_lines: usize,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
    /// SHA256 of the encoded transcript text.
    pub content_hash: String,
    /// Client version of the first user record, if there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

impl ShareMetadata {
    /// Describe an encoded, sanitized transcript.
    #[must_use]
    pub fn describe(messages: &[Message], report: &DecodeReport, encoded: &str) -> Self {
        let client_version = messages.iter().find_map(|m| match m {
            Message::User(user) if !user.client_version.is_empty() => {
                Some(user.client_version.clone())
            }
            _ => None,
        });

        Self {
            format: FORMAT.to_string(),
            stream_id: messages
                .first()
                .map(|m| m.stream_id().to_string())
                .unwrap_or_default(),
            message_count: messages.len(),
            skipped_lines: report.skipped.len(),
            exported_at: Utc::now().to_rfc3339(),
            content_hash: content_hash(encoded),
            client_version,
        }
    }

    /// Pretty JSON text of the sidecar, with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Sidecar path for a transcript: `x.jsonl` -> `x.meta.json`.
#[must_use]
pub fn sidecar_path(transcript: &Path) -> PathBuf {
    let mut name = transcript.file_stem().unwrap_or_default().to_os_string();
    name.push(".meta.json");
    transcript.with_file_name(name)
}

/// Write the sidecar for `transcript` atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_sidecar(transcript: &Path, meta: &ShareMetadata) -> Result<PathBuf> {
    let path = sidecar_path(transcript);
    atomic_write(&path, &meta.to_json()?)?;
    Ok(path)
}

/// Read the sidecar for `transcript`, if there is one.
///
/// # Errors
///
/// Returns an error if the sidecar exists but cannot be read or parsed.
pub fn read_sidecar(transcript: &Path) -> Result<Option<ShareMetadata>> {
    let path = sidecar_path(transcript);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(Error::Source { path, source }),
    };
    Ok(Some(serde_json::from_str(&text)?))
}
