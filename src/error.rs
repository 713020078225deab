//! Error types for the transcript-share CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=input, 3=not_found, 4=validation, 6=write, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for transcript-share operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Input (exit 2)
    EmptyInput,
    NoValidMessages,

    // Not Found (exit 3)
    SourceUnreadable,
    ShareNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Write (exit 6)
    PermissionDenied,
    OutOfSpace,
    WriteFailed,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::EmptyInput => "EMPTY_INPUT",
            Self::NoValidMessages => "NO_VALID_MESSAGES",
            Self::SourceUnreadable => "SOURCE_UNREADABLE",
            Self::ShareNotFound => "SHARE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::OutOfSpace => "OUT_OF_SPACE",
            Self::WriteFailed => "WRITE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::EmptyInput | Self::NoValidMessages => 2,
            Self::SourceUnreadable | Self::ShareNotFound => 3,
            Self::InvalidArgument => 4,
            Self::PermissionDenied | Self::OutOfSpace | Self::WriteFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying the same operation can reasonably succeed.
    ///
    /// True for write failures caused by the environment (space, transient I/O).
    /// False for bad input, which fails the same way every time.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::OutOfSpace | Self::WriteFailed | Self::IoError)
    }
}

// ── Write failure classification ──────────────────────────────

/// Why writing a transcript to disk failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    PermissionDenied,
    OutOfSpace,
    Other,
}

impl WriteFailure {
    /// Classify an I/O error raised while creating directories or writing.
    #[must_use]
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::StorageFull => Self::OutOfSpace,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::OutOfSpace => write!(f, "no space left on device"),
            Self::Other => write!(f, "I/O failure"),
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in transcript-share operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read transcript {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transcript contains no messages")]
    EmptyInput,

    #[error("No valid messages: all {skipped} non-empty lines were malformed")]
    NoValidMessages { skipped: usize },

    #[error("Failed to write {}: {kind}", path.display())]
    Write {
        path: PathBuf,
        kind: WriteFailure,
        #[source]
        source: io::Error,
    },

    #[error("Share not found: {id}")]
    ShareNotFound { id: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a write error, classifying the underlying I/O failure.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            kind: WriteFailure::classify(&source),
            source,
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Source { .. } => ErrorCode::SourceUnreadable,
            Self::EmptyInput => ErrorCode::EmptyInput,
            Self::NoValidMessages { .. } => ErrorCode::NoValidMessages,
            Self::Write { kind, .. } => match kind {
                WriteFailure::PermissionDenied => ErrorCode::PermissionDenied,
                WriteFailure::OutOfSpace => ErrorCode::OutOfSpace,
                WriteFailure::Other => ErrorCode::WriteFailed,
            },
            Self::ShareNotFound { .. } => ErrorCode::ShareNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Source { path, .. } => Some(format!(
                "Check that {} exists and is readable.",
                path.display()
            )),

            Self::EmptyInput => Some(
                "The transcript file is empty or contains only blank lines. \
                 Pick a transcript that has at least one message."
                    .to_string(),
            ),

            Self::NoValidMessages { .. } => Some(
                "Every line failed to parse. Run with -v to see why each line was skipped."
                    .to_string(),
            ),

            Self::Write { path, kind, .. } => match kind {
                WriteFailure::PermissionDenied => Some(format!(
                    "No write access to {}. Pick another destination or fix its permissions.",
                    path.display()
                )),
                WriteFailure::OutOfSpace => {
                    Some("Free up disk space and retry the operation.".to_string())
                }
                WriteFailure::Other => Some(format!(
                    "Writing {} failed; the destination was left untouched. Retry once the cause is fixed.",
                    path.display()
                )),
            },

            Self::ShareNotFound { id } => Some(format!(
                "No shared transcript with ID '{id}'. Check the ID or pass --store to point at the right store."
            )),

            Self::Config(_) => Some(
                "Set TSHARE_STORE / TSHARE_PROJECTS_DIR or pass --store / --projects-dir explicitly."
                    .to_string(),
            ),

            Self::Io(_) | Self::Json(_) | Self::InvalidArgument(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_classification() {
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(WriteFailure::classify(&denied), WriteFailure::PermissionDenied);

        let full = io::Error::from(io::ErrorKind::StorageFull);
        assert_eq!(WriteFailure::classify(&full), WriteFailure::OutOfSpace);

        let other = io::Error::from(io::ErrorKind::BrokenPipe);
        assert_eq!(WriteFailure::classify(&other), WriteFailure::Other);
    }

    #[test]
    fn test_write_errors_have_distinct_codes_and_hints() {
        let denied = Error::write("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        let full = Error::write("/x", io::Error::from(io::ErrorKind::StorageFull));
        let other = Error::write("/x", io::Error::other("boom"));

        assert_eq!(denied.error_code(), ErrorCode::PermissionDenied);
        assert_eq!(full.error_code(), ErrorCode::OutOfSpace);
        assert_eq!(other.error_code(), ErrorCode::WriteFailed);

        for err in [&denied, &full, &other] {
            assert_eq!(err.exit_code(), 6);
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn test_empty_and_all_malformed_are_distinct() {
        let empty = Error::EmptyInput;
        let malformed = Error::NoValidMessages { skipped: 3 };
        assert_ne!(empty.error_code(), malformed.error_code());
        assert_ne!(empty.to_string(), malformed.to_string());
    }

    #[test]
    fn test_every_error_maps_to_a_category_exit_code() {
        let errors = [
            Error::Source {
                path: "/x".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            Error::EmptyInput,
            Error::NoValidMessages { skipped: 1 },
            Error::write("/x", io::Error::other("boom")),
            Error::ShareNotFound { id: "x".into() },
            Error::Io(io::Error::other("boom")),
            Error::Json(serde_json::from_str::<serde_json::Value>("{").unwrap_err()),
            Error::InvalidArgument("x".into()),
            Error::Config("x".into()),
        ];
        for err in &errors {
            assert!((2..=8).contains(&err.exit_code()), "{err}");
        }
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::ShareNotFound { id: "abc".into() };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "SHARE_NOT_FOUND");
        assert_eq!(json["error"]["exit_code"], 3);
        assert!(json["error"]["hint"].as_str().unwrap().contains("abc"));
    }
}
