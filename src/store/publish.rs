//! Publishing and fetching shared transcripts.
//!
//! [`TranscriptStore`] is the seam between export/import and wherever shared
//! transcripts live. [`DirectoryStore`] keeps them in a local directory, one
//! subdirectory per share:
//!
//! ```text
//! <root>/<share id>/<name>.jsonl
//! <root>/<share id>/<name>.meta.json
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transcript::{ShareMetadata, atomic_write, read_sidecar, write_sidecar};

/// Extension of a stored transcript file.
const TRANSCRIPT_EXT: &str = "jsonl";

/// A transcript retrieved from a store.
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub id: String,
    pub name: String,
    /// Encoded transcript, as stored. Not checked for valid UTF-8 here; the
    /// decoder skips bad lines.
    pub transcript: Vec<u8>,
    pub metadata: Option<ShareMetadata>,
}

/// Somewhere shared transcripts can be published to and fetched from.
pub trait TranscriptStore {
    /// Publish an encoded transcript under `name`, returning its share id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unusable or the write fails.
    fn create(&self, name: &str, transcript: &str, metadata: &ShareMetadata) -> Result<String>;

    /// Fetch a previously published transcript.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShareNotFound`] for an unknown id.
    fn get(&self, id: &str) -> Result<FetchedTranscript>;
}

/// Share store backed by a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn share_dir(&self, id: &str) -> Result<PathBuf> {
        if !is_plain_name(id) {
            return Err(Error::ShareNotFound { id: id.to_string() });
        }
        Ok(self.root.join(id))
    }
}

/// A single path component: non-empty, no separators, not `.` or `..`.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl TranscriptStore for DirectoryStore {
    fn create(&self, name: &str, transcript: &str, metadata: &ShareMetadata) -> Result<String> {
        let name = name.strip_suffix(".jsonl").unwrap_or(name);
        if !is_plain_name(name) {
            return Err(Error::InvalidArgument(format!(
                "share name must be a plain file name, got '{name}'"
            )));
        }

        let id = Uuid::new_v4().to_string();
        let path = self.share_dir(&id)?.join(format!("{name}.{TRANSCRIPT_EXT}"));
        atomic_write(&path, transcript)?;
        write_sidecar(&path, metadata)?;

        tracing::info!(%id, name, "published transcript");
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<FetchedTranscript> {
        let dir = self.share_dir(id)?;
        let not_found = || Error::ShareNotFound { id: id.to_string() };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(source) => return Err(Error::Source { path: dir, source }),
        };

        let mut transcripts = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == TRANSCRIPT_EXT) {
                transcripts.push(path);
            }
        }
        transcripts.sort();
        let path = transcripts.into_iter().next().ok_or_else(not_found)?;

        let transcript = fs::read(&path).map_err(|source| Error::Source {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(%id, path = %path.display(), "fetched transcript");
        Ok(FetchedTranscript {
            id: id.to_string(),
            name,
            transcript,
            metadata: read_sidecar(&path)?,
        })
    }
}
