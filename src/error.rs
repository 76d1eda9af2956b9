//! # Error Handling
//!
//! This module defines the centralized error type for `projsynth`. It uses
//! `thiserror` to derive a single `Error` enum covering every failure the
//! synthesis engine can report, plus a `Result<T>` alias used throughout the
//! library.
//!
//! ## Error Kinds
//!
//! - **Validation errors** (`PathNotFound`, `TypeMismatch`, `PatchTestFailed`,
//!   `InvalidPatch`, `InvalidPointer`) abort a synthesis run before anything
//!   is written.
//! - **`Commit`** is the aggregate failure of the final write pass. It lists
//!   the paths that were written and the paths that were not.
//! - **Input errors** (`ConfigParse`, `Dependency`, `Path`) describe problems
//!   in the declarative input itself.
//! - Wrapped errors from `std::io` and `glob`, plus `serde_yaml` and
//!   `serde_json` failures raised while rendering documents.
//!
//! There is deliberately no duplicate-dependency error: duplicate names are
//! resolved by `dependencies::resolve`, never rejected.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for projsynth operations
#[derive(Error, Debug)]
pub enum Error {
    /// A patch addressed a file that is not in the store, or a structural
    /// path that does not exist inside the document.
    ///
    /// `path` is empty when the file itself is missing. `file` is empty when
    /// the error comes from patching a bare document outside the store.
    #[error("Path not found: {}", describe(file, path))]
    PathNotFound { file: String, path: String },

    /// A structured operation was aimed at a text file, or the other way round.
    #[error("Type mismatch for {file}: expected {expected}, found {found}")]
    TypeMismatch {
        file: String,
        expected: String,
        found: String,
    },

    /// A `test` patch operation found a different value than expected.
    #[error("Patch test failed: {}", describe(file, path))]
    PatchTestFailed { file: String, path: String },

    /// A patch operation that can never succeed, such as moving a value into
    /// one of its own children.
    #[error("Invalid patch operation: {message}")]
    InvalidPatch { message: String },

    /// A structural path string could not be parsed.
    #[error("Invalid pointer '{pointer}': {message}")]
    InvalidPointer { pointer: String, message: String },

    /// One or more files failed to persist during commit.
    ///
    /// Already written files are not rolled back. Re-running synthesis with
    /// the same input repairs the output directory.
    #[error("Commit failed for {} of {} files: {}", failed.len(), failed.len() + written.len(), format_failures(failed))]
    Commit {
        written: Vec<PathBuf>,
        failed: Vec<(PathBuf, String)>,
    },

    /// The declarative configuration could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A dependency specification string was malformed.
    #[error("Invalid dependency '{spec}': {message}")]
    Dependency { spec: String, message: String },

    /// A file path was rejected during normalization.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML document could not be rendered, wrapped from `serde_yaml::Error`.
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON document could not be rendered, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    /// Whether this error was raised while validating declarative mutations,
    /// as opposed to while writing output.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound { .. }
                | Error::TypeMismatch { .. }
                | Error::PatchTestFailed { .. }
                | Error::InvalidPatch { .. }
                | Error::InvalidPointer { .. }
        )
    }

    /// Attach the store path of the document being patched to errors raised
    /// by the pure patch functions, which do not know which file they run on.
    pub fn in_file(self, name: &str) -> Self {
        match self {
            Error::PathNotFound { file, path } if file.is_empty() => Error::PathNotFound {
                file: name.to_string(),
                path,
            },
            Error::PatchTestFailed { file, path } if file.is_empty() => Error::PatchTestFailed {
                file: name.to_string(),
                path,
            },
            Error::TypeMismatch {
                file,
                expected,
                found,
            } if file.is_empty() => Error::TypeMismatch {
                file: name.to_string(),
                expected,
                found,
            },
            other => other,
        }
    }
}

fn describe(file: &str, path: &str) -> String {
    match (file.is_empty(), path.is_empty()) {
        (false, false) => format!("{} at {}", file, path),
        (false, true) => file.to_string(),
        _ => path.to_string(),
    }
}

fn format_failures(failed: &[(PathBuf, String)]) -> String {
    failed
        .iter()
        .map(|(path, reason)| format!("{} ({})", path.display(), reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
