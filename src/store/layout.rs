//! Where imported transcripts land.
//!
//! The local client keeps one directory per project, named by an encoding of
//! the project's directory path. [`StorageLayout`] is that mapping; import
//! takes one as a collaborator so tests can point it at a temp directory.

use std::path::{Path, PathBuf};

/// Mapping from a project directory to the directory holding its transcripts.
pub trait StorageLayout {
    /// Storage key for a project directory.
    fn encode(&self, dir: &str) -> String;

    /// Directory holding the transcripts stored under `key`.
    fn resolve_storage_dir(&self, key: &str) -> PathBuf;

    /// Shorthand for `resolve_storage_dir(&encode(dir))`.
    fn storage_dir_for(&self, dir: &str) -> PathBuf {
        self.resolve_storage_dir(&self.encode(dir))
    }
}

/// `<root>/<encoded project path>/` layout.
///
/// Every character outside `[A-Za-z0-9-]` becomes `-`, so
/// `/home/me/my_proj` is stored under `-home-me-my-proj`. The encoding is not
/// reversible.
#[derive(Debug, Clone)]
pub struct ProjectsLayout {
    root: PathBuf,
}

impl ProjectsLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageLayout for ProjectsLayout {
    fn encode(&self, dir: &str) -> String {
        dir.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
            .collect()
    }

    fn resolve_storage_dir(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}
