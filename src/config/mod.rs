//! Configuration management.
//!
//! Resolves the directories the CLI works with. Environment variables are
//! only read here; the transcript and store layers take plain paths.
//!
//! # Layout
//!
//! - **Shares**: `~/.tshare/shares/` holds published transcripts
//! - **Projects**: `~/.tshare/projects/` holds imported transcripts, one
//!   directory per encoded project path

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable overriding the share store directory.
pub const STORE_ENV: &str = "TSHARE_STORE";
/// Environment variable overriding the projects root.
pub const PROJECTS_ENV: &str = "TSHARE_PROJECTS_DIR";

/// Get the global tshare directory (`~/.tshare/`).
#[must_use]
pub fn global_tshare_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".tshare"))
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

fn resolve_dir(explicit: Option<&Path>, env: &str, default_subdir: &str) -> Result<PathBuf> {
    // Priority 1: Explicit path from CLI flag
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Some(path) = env_path(env) {
        return Ok(path);
    }

    // Priority 3: Home directory default
    global_tshare_dir()
        .map(|dir| dir.join(default_subdir))
        .ok_or_else(|| {
            Error::Config(format!(
                "cannot determine home directory; set {env} or pass the directory explicitly"
            ))
        })
}

/// Resolve the share store directory.
///
/// Priority:
/// 1. `explicit` (the `--store` flag)
/// 2. `TSHARE_STORE`
/// 3. `~/.tshare/shares`
///
/// # Errors
///
/// Returns [`Error::Config`] if nothing is set and there is no home directory.
pub fn resolve_store_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_dir(explicit, STORE_ENV, "shares")
}

/// Resolve the projects root that imports are written under.
///
/// Priority:
/// 1. `explicit` (the `--projects-dir` flag)
/// 2. `TSHARE_PROJECTS_DIR`
/// 3. `~/.tshare/projects`
///
/// # Errors
///
/// Returns [`Error::Config`] if nothing is set and there is no home directory.
pub fn resolve_projects_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_dir(explicit, PROJECTS_ENV, "projects")
}

/// Current working directory as a string, used as the default import target.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read.
pub fn current_dir_string() -> Result<String> {
    Ok(std::env::current_dir()?.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("/tmp/explicit");
        assert_eq!(resolve_store_dir(Some(explicit)).unwrap(), explicit);
        assert_eq!(resolve_projects_dir(Some(explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_unset_env_var_falls_through() {
        // A variable nobody sets behaves like an unset one.
        assert!(env_path("TSHARE_TEST_SURELY_UNSET_VARIABLE").is_none());
        let resolved = resolve_dir(None, "TSHARE_TEST_SURELY_UNSET_VARIABLE", "shares");
        if let Some(home) = global_tshare_dir() {
            assert_eq!(resolved.unwrap(), home.join("shares"));
        } else {
            assert!(matches!(resolved, Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_global_dir_is_under_home() {
        if let Some(dir) = global_tshare_dir() {
            assert!(dir.ends_with(".tshare"));
        }
    }
}
