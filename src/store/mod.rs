//! Storage collaborators for sharing.
//!
//! - [`layout`]: where imported transcripts are written
//! - [`publish`]: where shared transcripts are published and fetched

pub mod layout;
pub mod publish;

pub use layout::{ProjectsLayout, StorageLayout};
pub use publish::{DirectoryStore, FetchedTranscript, TranscriptStore};
