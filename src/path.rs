//! Path manipulation utilities for projsynth

use std::path::PathBuf;

use crate::error::{Error, Result};
use glob::Pattern;

/// Normalize a virtual file path into the key used by the store.
///
/// Leading `/` and `./` are stripped, backslashes become forward slashes and
/// empty or `.` segments are dropped, so `"/package.json"`,
/// `"./package.json"` and `"package.json"` all name the same file.
///
/// Paths that climb above the output root (`..`) or that are empty after
/// normalization are rejected.
///
/// # Examples
///
/// ```
/// use projsynth::path::normalize;
///
/// assert_eq!(normalize("/.github//workflows/build.yml").unwrap(), ".github/workflows/build.yml");
/// assert!(normalize("../outside.json").is_err());
/// ```
pub fn normalize(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(Error::Path {
                    message: format!("Path escapes the output root: {}", path),
                });
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(Error::Path {
            message: format!("Path is empty after normalization: '{}'", path),
        });
    }

    Ok(segments.join("/"))
}

/// Normalize a path and convert it into the `PathBuf` key of the store.
pub fn to_key(path: &str) -> Result<PathBuf> {
    normalize(path).map(PathBuf::from)
}

/// Check that a glob pattern compiles
pub fn validate_pattern(pattern: &str) -> Result<()> {
    Pattern::new(pattern).map(|_| ()).map_err(Error::Glob)
}
