//! Export and import of shared transcripts.
//!
//! # Export
//!
//! decode → sanitize → encode. The encoded text is described by a
//! [`ShareMetadata`] sidecar and either written to a file or published to a
//! [`TranscriptStore`].
//!
//! # Import
//!
//! decode → remap identifiers → write into the local client's storage
//! directory for the target project, as `<new stream id>.jsonl`. A content
//! hash mismatch against the sidecar is logged, not fatal.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::{StorageLayout, TranscriptStore};
use crate::transcript::file::{
    Decoded, atomic_write, decode_file, decode_reader, encode, write_transcript,
};
use crate::transcript::hash::hash_matches;
use crate::transcript::meta::{ShareMetadata, read_sidecar, write_sidecar};
use crate::transcript::remap::IdRemapper;
use crate::transcript::sanitize::{SanitizeSummary, sanitize_with_summary};
use crate::transcript::types::Message;

/// Statistics for an export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    /// Messages in the shared transcript.
    pub messages: usize,
    /// Source lines dropped by the decoder.
    pub skipped_lines: usize,
    #[serde(flatten)]
    pub sanitized: SanitizeSummary,
    pub content_hash: String,
}

/// A sanitized transcript, ready to be written or published.
#[derive(Debug, Clone)]
pub struct Exported {
    pub messages: Vec<Message>,
    /// Encoded transcript text.
    pub encoded: String,
    pub metadata: ShareMetadata,
    pub stats: ExportStats,
}

impl Exported {
    /// Write the transcript and its sidecar next to each other.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn write_to(&self, path: &Path) -> Result<PathBuf> {
        atomic_write(path, &self.encoded)?;
        write_sidecar(path, &self.metadata)
    }

    /// Publish the transcript under `name`, returning the share id.
    ///
    /// # Errors
    ///
    /// Returns whatever the store returns.
    pub fn publish(&self, store: &dyn TranscriptStore, name: &str) -> Result<String> {
        store.create(name, &self.encoded, &self.metadata)
    }
}

/// Sanitizing exporter.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    base_path: Option<String>,
}

impl Exporter {
    /// Exporter that infers the base path from each transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exporter rewriting paths relative to `base_path`.
    #[must_use]
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    /// Export a transcript file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds no usable
    /// messages.
    pub fn export_file(&self, source: &Path) -> Result<Exported> {
        self.export(decode_file(source)?)
    }

    /// Export transcript text read from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or there are no usable messages.
    pub fn export_reader(&self, reader: impl std::io::BufRead) -> Result<Exported> {
        self.export(decode_reader(reader)?)
    }

    fn export(&self, decoded: Decoded) -> Result<Exported> {
        let Decoded { messages, report } = decoded.require_messages()?;

        let (messages, sanitized) = sanitize_with_summary(&messages, self.base_path.as_deref());
        let encoded = encode(&messages)?;
        let metadata = ShareMetadata::describe(&messages, &report, &encoded);

        let stats = ExportStats {
            messages: messages.len(),
            skipped_lines: report.skipped.len(),
            sanitized,
            content_hash: metadata.content_hash.clone(),
        };
        tracing::info!(
            messages = stats.messages,
            skipped = stats.skipped_lines,
            secrets = stats.sanitized.secrets_redacted,
            "exported transcript"
        );

        Ok(Exported {
            messages,
            encoded,
            metadata,
            stats,
        })
    }
}

/// Statistics for an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportStats {
    pub messages: usize,
    pub skipped_lines: usize,
    /// Stream id given to the imported copy.
    pub stream_id: String,
    /// Identifiers replaced.
    pub identifiers: usize,
    pub path: PathBuf,
    /// Whether the content matched the sidecar hash; `None` without a sidecar.
    pub hash_verified: Option<bool>,
}

/// Importer writing into a project's storage directory.
pub struct Importer<'a> {
    layout: &'a dyn StorageLayout,
    target_dir: String,
}

impl<'a> Importer<'a> {
    /// Importer for the project at `target_dir`.
    #[must_use]
    pub fn new(layout: &'a dyn StorageLayout, target_dir: impl Into<String>) -> Self {
        Self {
            layout,
            target_dir: target_dir.into(),
        }
    }

    /// Directory imported transcripts are written to.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.layout.storage_dir_for(&self.target_dir)
    }

    /// Fetch a share from `store` and import it.
    ///
    /// # Errors
    ///
    /// Returns an error if the share is missing, holds no usable messages,
    /// or cannot be written.
    pub fn import_share(&self, store: &dyn TranscriptStore, id: &str) -> Result<ImportStats> {
        let fetched = store.get(id)?;
        self.import_bytes(&fetched.transcript, fetched.metadata.as_ref())
    }

    /// Import a transcript file, checking it against its sidecar if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, holds no usable
    /// messages, or cannot be written.
    pub fn import_file(&self, path: &Path) -> Result<ImportStats> {
        let bytes = std::fs::read(path).map_err(|source| Error::Source {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = read_sidecar(path)?;
        self.import_bytes(&bytes, metadata.as_ref())
    }

    /// Import an encoded transcript. Lines that are not valid UTF-8 are
    /// skipped like any other malformed line.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no usable messages or the write fails.
    pub fn import_bytes(
        &self,
        transcript: &[u8],
        metadata: Option<&ShareMetadata>,
    ) -> Result<ImportStats> {
        let hash_verified = metadata.map(|m| hash_matches(transcript, Some(&m.content_hash)));
        if hash_verified == Some(false) {
            tracing::warn!("transcript content does not match its recorded hash");
        }

        let Decoded { messages, report } =
            decode_reader(transcript)?.require_messages()?;

        let mut remapper = IdRemapper::new();
        let remapped = remapper.remap_all(&messages);
        let stream_id = remapped
            .first()
            .map(|m| m.stream_id().to_string())
            .ok_or(Error::EmptyInput)?;

        let path = self.storage_dir().join(format!("{stream_id}.jsonl"));
        write_transcript(&remapped, &path)?;

        Ok(ImportStats {
            messages: remapped.len(),
            skipped_lines: report.skipped.len(),
            stream_id,
            identifiers: remapper.len(),
            path,
            hash_verified,
        })
    }
}
