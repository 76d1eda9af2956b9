//! Structured patch engine
//!
//! Applies ordered lists of JSON-Patch style operations (`add`, `replace`,
//! `remove`, `test`, `move`, `copy`) to JSON-shaped documents.
//!
//! ## Semantics
//!
//! - Paths are walked from the root one segment at a time. Intermediate
//!   containers are never created: every parent of the target must exist.
//! - `add` may create the final segment. On a sequence it inserts at the
//!   index (shifting later elements) or appends when the index equals the
//!   length or is `-`. On a mapping it inserts or overwrites the key.
//! - `replace`, `remove` and `test` require the target to exist.
//! - Operations run in order and see the effects of earlier ones. If any
//!   operation fails the document is left exactly as it was.
//! - Values are opaque. `1` and `"1"` are different values and nothing is
//!   coerced.
//!
//! For merging fragments with automatic creation of intermediate objects, see
//! the `merge` submodule.

pub mod merge;
pub mod pointer;

pub use merge::{merge_at, merge_values, ArrayMerge};
pub use pointer::{parse_path, PathSegment, Pointer};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// A single structural patch operation.
///
/// Serialized the way RFC 6902 writes operations:
///
/// ```yaml
/// - { op: add, path: /scripts/test, value: jest }
/// - { op: move, from: /scripts/old, path: /scripts/new }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    /// Insert a value, creating the final path segment if needed.
    Add { path: String, value: JsonValue },
    /// Overwrite an existing value in place.
    Replace { path: String, value: JsonValue },
    /// Delete an existing mapping entry or sequence element.
    Remove { path: String },
    /// Assert that an existing value equals `value`.
    Test { path: String, value: JsonValue },
    /// Remove the value at `from` and add it at `path`.
    Move { from: String, path: String },
    /// Add a copy of the value at `from` at `path`.
    Copy { from: String, path: String },
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: JsonValue) -> Self {
        PatchOperation::Add {
            path: path.into(),
            value,
        }
    }

    pub fn replace(path: impl Into<String>, value: JsonValue) -> Self {
        PatchOperation::Replace {
            path: path.into(),
            value,
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        PatchOperation::Remove { path: path.into() }
    }

    pub fn test(path: impl Into<String>, value: JsonValue) -> Self {
        PatchOperation::Test {
            path: path.into(),
            value,
        }
    }

    pub fn move_value(from: impl Into<String>, path: impl Into<String>) -> Self {
        PatchOperation::Move {
            from: from.into(),
            path: path.into(),
        }
    }

    pub fn copy_value(from: impl Into<String>, path: impl Into<String>) -> Self {
        PatchOperation::Copy {
            from: from.into(),
            path: path.into(),
        }
    }

    /// Operation name as written in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            PatchOperation::Add { .. } => "add",
            PatchOperation::Replace { .. } => "replace",
            PatchOperation::Remove { .. } => "remove",
            PatchOperation::Test { .. } => "test",
            PatchOperation::Move { .. } => "move",
            PatchOperation::Copy { .. } => "copy",
        }
    }

    /// The target path of the operation.
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Test { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. } => path,
        }
    }
}

/// Apply `operations` to `document` in order.
///
/// The operations run against a working copy which replaces `document` only
/// when every operation succeeded.
///
/// # Errors
///
/// - `Error::PathNotFound` when a path (or a parent, for `add`) is missing.
/// - `Error::PatchTestFailed` when a `test` operation does not match.
/// - `Error::InvalidPatch` for operations that can never apply, such as
///   removing the root or moving a value into its own child.
/// - `Error::InvalidPointer` for malformed paths.
///
/// Errors carry an empty file name; `Error::in_file` attaches one.
///
/// # Examples
///
/// ```
/// use projsynth::patch::{apply_patch, PatchOperation};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// apply_patch(&mut doc, &[
///     PatchOperation::add("/a", json!(1)),
///     PatchOperation::replace("/a", json!(2)),
/// ]).unwrap();
/// assert_eq!(doc, json!({"a": 2}));
/// ```
pub fn apply_patch(document: &mut JsonValue, operations: &[PatchOperation]) -> Result<()> {
    let mut working = document.clone();
    for operation in operations {
        apply_operation(&mut working, operation)?;
    }
    *document = working;
    Ok(())
}

/// Apply a single operation in place.
///
/// A failing `move` may already have removed its source.
pub fn apply_operation(document: &mut JsonValue, operation: &PatchOperation) -> Result<()> {
    match operation {
        PatchOperation::Add { path, value } => add(document, &Pointer::parse(path)?, value.clone()),
        PatchOperation::Replace { path, value } => {
            replace(document, &Pointer::parse(path)?, value.clone())
        }
        PatchOperation::Remove { path } => remove(document, &Pointer::parse(path)?).map(|_| ()),
        PatchOperation::Test { path, value } => test(document, &Pointer::parse(path)?, value),
        PatchOperation::Move { from, path } => {
            let from = Pointer::parse(from)?;
            let to = Pointer::parse(path)?;
            if from.is_proper_prefix_of(&to) {
                return Err(Error::InvalidPatch {
                    message: format!("cannot move '{}' into its own child '{}'", from, to),
                });
            }
            if from.segments() == to.segments() {
                return get(document, &from).map(|_| ());
            }
            let value = remove(document, &from)?;
            add(document, &to, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = get(document, &Pointer::parse(from)?)?.clone();
            add(document, &Pointer::parse(path)?, value)
        }
    }
}

fn not_found(pointer: &Pointer) -> Error {
    Error::PathNotFound {
        file: String::new(),
        path: pointer.to_string(),
    }
}

fn step<'a>(value: &'a JsonValue, segment: &PathSegment) -> Option<&'a JsonValue> {
    match value {
        JsonValue::Object(map) => map.get(segment.key().as_ref()),
        JsonValue::Array(items) => segment.index().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut JsonValue, segment: &PathSegment) -> Option<&'a mut JsonValue> {
    match value {
        JsonValue::Object(map) => map.get_mut(segment.key().as_ref()),
        JsonValue::Array(items) => segment.index().and_then(move |idx| items.get_mut(idx)),
        _ => None,
    }
}

fn walk<'a>(document: &'a JsonValue, segments: &[PathSegment]) -> Option<&'a JsonValue> {
    segments
        .iter()
        .try_fold(document, |current, segment| step(current, segment))
}

fn walk_mut<'a>(
    document: &'a mut JsonValue,
    segments: &[PathSegment],
) -> Option<&'a mut JsonValue> {
    let mut current = document;
    for segment in segments {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

/// Look up the value at `pointer`.
pub fn get<'a>(document: &'a JsonValue, pointer: &Pointer) -> Result<&'a JsonValue> {
    walk(document, pointer.segments()).ok_or_else(|| not_found(pointer))
}

fn add(document: &mut JsonValue, pointer: &Pointer, value: JsonValue) -> Result<()> {
    let Some((parent_path, last)) = pointer.split_last() else {
        *document = value;
        return Ok(());
    };

    let parent = walk_mut(document, parent_path).ok_or_else(|| not_found(pointer))?;
    match parent {
        JsonValue::Object(map) => {
            map.insert(last.key().into_owned(), value);
            Ok(())
        }
        JsonValue::Array(items) => {
            if last.is_append() {
                items.push(value);
                return Ok(());
            }
            match last.index() {
                Some(idx) if idx <= items.len() => {
                    items.insert(idx, value);
                    Ok(())
                }
                _ => Err(not_found(pointer)),
            }
        }
        _ => Err(not_found(pointer)),
    }
}

fn replace(document: &mut JsonValue, pointer: &Pointer, value: JsonValue) -> Result<()> {
    let target = walk_mut(document, pointer.segments()).ok_or_else(|| not_found(pointer))?;
    *target = value;
    Ok(())
}

fn remove(document: &mut JsonValue, pointer: &Pointer) -> Result<JsonValue> {
    let Some((parent_path, last)) = pointer.split_last() else {
        return Err(Error::InvalidPatch {
            message: "cannot remove the document root".to_string(),
        });
    };

    let parent = walk_mut(document, parent_path).ok_or_else(|| not_found(pointer))?;
    match parent {
        JsonValue::Object(map) => map
            .shift_remove(last.key().as_ref())
            .ok_or_else(|| not_found(pointer)),
        JsonValue::Array(items) => match last.index() {
            Some(idx) if idx < items.len() => Ok(items.remove(idx)),
            _ => Err(not_found(pointer)),
        },
        _ => Err(not_found(pointer)),
    }
}

fn test(document: &JsonValue, pointer: &Pointer, expected: &JsonValue) -> Result<()> {
    if get(document, pointer)? == expected {
        Ok(())
    } else {
        Err(Error::PatchTestFailed {
            file: String::new(),
            path: pointer.to_string(),
        })
    }
}
