//! Transcript sanitization and re-identification.
//!
//! - **Model**: user, assistant (legacy or block layout) and file-snapshot records
//! - **Decode/Encode**: line-oriented JSONL with per-line recovery
//! - **Sanitize**: base-relative paths, reasoning removed, secrets redacted
//! - **Remap**: fresh identifiers with parent links preserved
//! - **Share**: export/import orchestration with a metadata sidecar
//!
//! # File Format
//!
//! One record per line, discriminated by `type`:
//! ```json
//! {"type":"user","id":"m1","streamId":"s1","timestamp":"2025-01-20T10:00:00Z","parentId":null,"message":{"role":"user","content":"hi"},"workingDirectory":"/home/me/proj","clientVersion":"1.0.0"}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tshare::transcript::{Exporter, Importer};
//! use tshare::store::{DirectoryStore, ProjectsLayout};
//!
//! let store = DirectoryStore::new(store_dir);
//! let exported = Exporter::new().export_file(&source)?;
//! let id = exported.publish(&store, "session")?;
//!
//! let layout = ProjectsLayout::new(projects_dir);
//! let stats = Importer::new(&layout, "/home/you/proj").import_share(&store, &id)?;
//! ```

mod file;
mod hash;
mod meta;
mod paths;
mod redact;
mod remap;
mod sanitize;
mod share;
mod types;

pub use file::{
    DecodeReport, Decoded, SkipReason, SkippedLine, atomic_write, decode_file, decode_line,
    decode_reader, encode, write_transcript,
};
pub use hash::{content_hash, hash_matches};
pub use meta::{FORMAT, ShareMetadata, read_sidecar, sidecar_path, write_sidecar};
pub use paths::{PathRewriter, sanitize_path, sanitize_text};
pub use redact::{REDACTED, REDACTED_PRIVATE_KEY, Redaction, SecretKind, redact, scan};
pub use remap::IdRemapper;
pub use sanitize::{SanitizeSummary, Sanitizer, infer_base_path, sanitize, sanitize_with_summary};
pub use share::{ExportStats, Exported, Exporter, ImportStats, Importer};
pub use types::{
    AssistantContent, AssistantRecord, BlockResponse, ContentBlock, Envelope, FileSnapshot,
    LegacyContent, LegacyEntry, Message, ModelError, RecordKind, Representation, SnapshotRecord,
    TextBlock, TrackedFile, Usage, UserContent, UserRecord, detect_representation,
};
