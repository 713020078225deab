//! Transcript file I/O.
//!
//! - Decoding: line-by-line, each line parsed on its own; bad lines are
//!   skipped and reported instead of failing the whole stream
//! - Encoding: one JSON object per line with a trailing newline
//! - Atomic writes: write to temp file, sync to disk, then rename

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::transcript::types::{Message, ModelError};

/// Why a non-blank line was dropped by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The line is not valid UTF-8.
    InvalidUtf8,
    /// The line is not valid JSON.
    InvalidJson(String),
    /// The line is JSON but not a usable record.
    Record(ModelError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
            Self::InvalidJson(message) => write!(f, "invalid JSON: {message}"),
            Self::Record(err) => write!(f, "{err}"),
        }
    }
}

/// A dropped line and the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Line number (1-indexed).
    pub line: usize,
    pub reason: SkipReason,
}

/// Side-channel report of what the decoder saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Total number of lines read, blank ones included.
    pub lines_read: usize,
    /// Number of blank or whitespace-only lines.
    pub blank_lines: usize,
    /// Lines that could not be decoded, in input order.
    pub skipped: Vec<SkippedLine>,
}

/// Result of decoding a transcript: the usable messages plus the report.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub messages: Vec<Message>,
    pub report: DecodeReport,
}

impl Decoded {
    /// Fail if decoding produced no messages.
    ///
    /// An input with nothing but blank lines is [`Error::EmptyInput`]; an
    /// input whose every non-blank line was dropped is
    /// [`Error::NoValidMessages`].
    ///
    /// # Errors
    ///
    /// Returns one of the two errors above when `messages` is empty.
    pub fn require_messages(self) -> Result<Self> {
        if !self.messages.is_empty() {
            return Ok(self);
        }
        if self.report.skipped.is_empty() {
            Err(Error::EmptyInput)
        } else {
            Err(Error::NoValidMessages {
                skipped: self.report.skipped.len(),
            })
        }
    }
}

/// Decode a single non-blank line.
///
/// # Errors
///
/// Returns the reason the line cannot be used.
pub fn decode_line(line: &str) -> std::result::Result<Message, SkipReason> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;
    Message::from_value(value).map_err(SkipReason::Record)
}

/// Decode a transcript from any buffered reader.
///
/// Lines are read one at a time. Blank lines are skipped silently, lines
/// that fail to decode are logged and recorded in the report, and the
/// remaining messages are returned in input order.
///
/// # Errors
///
/// Returns an error only if the reader itself fails.
pub fn decode_reader<R: BufRead>(mut reader: R) -> std::io::Result<Decoded> {
    let mut decoded = Decoded::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        decoded.report.lines_read += 1;
        let line_num = decoded.report.lines_read;

        let result = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => {
                decoded.report.blank_lines += 1;
                continue;
            }
            Ok(line) => decode_line(line.trim()),
            Err(_) => Err(SkipReason::InvalidUtf8),
        };

        match result {
            Ok(message) => decoded.messages.push(message),
            Err(reason) => {
                tracing::warn!(line = line_num, %reason, "skipping transcript line");
                decoded.report.skipped.push(SkippedLine {
                    line: line_num,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        messages = decoded.messages.len(),
        skipped = decoded.report.skipped.len(),
        "decoded transcript"
    );
    Ok(decoded)
}

/// Decode a transcript file.
///
/// # Errors
///
/// Returns [`Error::Source`] if the file cannot be opened or read. Bad
/// lines are not errors; see [`decode_reader`].
pub fn decode_file(path: &Path) -> Result<Decoded> {
    let source = |source| Error::Source {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(source)?;
    decode_reader(BufReader::new(file)).map_err(source)
}

/// Serialize messages to transcript text.
///
/// One JSON object per line, in input order, each followed by `\n`.
///
/// # Errors
///
/// Returns an error if a message cannot be serialized.
pub fn encode(messages: &[Message]) -> Result<String> {
    let mut content = String::new();
    for message in messages {
        let line = serde_json::to_string(message)?;
        content.push_str(&line);
        content.push('\n');
    }
    Ok(content)
}

/// Temp file used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write content to a file atomically.
///
/// This function:
/// 1. Creates any missing parent directories
/// 2. Writes content to a temporary sibling file
/// 3. Calls `fsync` to ensure data is on disk
/// 4. Atomically renames the temp file to the target path
///
/// If any step fails, the temp file is removed and the original file (if
/// any) remains untouched.
///
/// # Errors
///
/// Returns [`Error::Write`] classified as permission denied, out of space,
/// or other.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }

    let temp_path = temp_path(path);
    let written = (|| -> std::io::Result<()> {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::write(path, e));
    }

    Ok(())
}

/// Write messages to a transcript file atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_transcript(messages: &[Message], path: &Path) -> Result<()> {
    let content = encode(messages)?;
    atomic_write(path, &content)?;
    tracing::info!(path = %path.display(), messages = messages.len(), "wrote transcript");
    Ok(())
}
