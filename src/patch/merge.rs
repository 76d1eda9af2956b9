//! Deep merge of fragments into documents
//!
//! Where the patch engine is strict about missing parents, merging is the
//! explicit override hook: the target path is created on the way down and the
//! fragment is merged recursively into whatever is there.
//!
//! - Objects: keys merge recursively, fragment values win on conflicts.
//! - Arrays: replaced by default, or extended at the end or start depending
//!   on `ArrayMerge`.
//! - Scalars: replaced by the fragment.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::pointer::{PathSegment, Pointer};
use crate::error::{Error, Result};

/// How arrays present on both sides are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMerge {
    /// The fragment array replaces the target array.
    #[default]
    Replace,
    /// Fragment items are appended to the target array.
    Append,
    /// Fragment items are inserted before the target items.
    Prepend,
}

/// Navigate to a specific path within a JSON value, creating intermediate
/// structures as needed.
///
/// Null values along the way become objects or arrays depending on the
/// segment and missing keys are inserted as empty objects. An array index may
/// point at an existing item or one past the end (or `-`), which appends a
/// new slot. Arrays are never padded.
///
/// # Errors
///
/// Returns `Error::TypeMismatch` if the path runs into a scalar, or into a
/// container of the other kind, and `Error::PathNotFound` for an index past
/// the end of an array.
pub fn navigate_json_value<'a>(
    value: &'a mut JsonValue,
    path: &[PathSegment],
) -> Result<&'a mut JsonValue> {
    let mut current = value;
    for (depth, segment) in path.iter().enumerate() {
        if current.is_null() {
            *current = match segment {
                PathSegment::Index(_) => JsonValue::Array(Vec::new()),
                PathSegment::Key(_) => JsonValue::Object(serde_json::Map::new()),
            };
        }

        current = match current {
            JsonValue::Object(map) => map
                .entry(segment.key().into_owned())
                .or_insert_with(|| JsonValue::Object(serde_json::Map::new())),
            JsonValue::Array(items) => {
                let idx = if segment.is_append() {
                    items.len()
                } else {
                    segment.index().ok_or_else(|| mismatch(segment, "array"))?
                };
                if idx > items.len() {
                    return Err(Error::PathNotFound {
                        file: String::new(),
                        path: pointer_text(&path[..=depth]),
                    });
                }
                if idx == items.len() {
                    items.push(JsonValue::Null);
                }
                &mut items[idx]
            }
            other => return Err(mismatch(segment, kind_of(other))),
        };
    }

    Ok(current)
}

fn mismatch(segment: &PathSegment, found: &str) -> Error {
    Error::TypeMismatch {
        file: String::new(),
        expected: format!("container for '{}'", segment.key()),
        found: found.to_string(),
    }
}

fn pointer_text(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.key().replace('~', "~0").replace('/', "~1")))
        .collect()
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Recursively merge `source` into `target`.
pub fn merge_values(target: &mut JsonValue, source: &JsonValue, arrays: ArrayMerge) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value, arrays),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (JsonValue::Array(target_items), JsonValue::Array(source_items)) => match arrays {
            ArrayMerge::Replace => *target_items = source_items.clone(),
            ArrayMerge::Append => target_items.extend(source_items.iter().cloned()),
            ArrayMerge::Prepend => {
                let mut combined = source_items.clone();
                combined.append(target_items);
                *target_items = combined;
            }
        },
        (target, source) => *target = source.clone(),
    }
}

/// Merge `fragment` into `document` at `at`, creating the path if needed.
///
/// # Examples
///
/// ```
/// use projsynth::patch::{merge_at, ArrayMerge};
/// use serde_json::json;
///
/// let mut doc = json!({"compilerOptions": {"strict": false}});
/// merge_at(&mut doc, "compilerOptions", &json!({"strict": true, "outDir": "lib"}), ArrayMerge::Replace).unwrap();
/// assert_eq!(doc["compilerOptions"]["strict"], json!(true));
/// assert_eq!(doc["compilerOptions"]["outDir"], json!("lib"));
/// ```
pub fn merge_at(
    document: &mut JsonValue,
    at: &str,
    fragment: &JsonValue,
    arrays: ArrayMerge,
) -> Result<()> {
    let pointer = Pointer::parse(at)?;
    let target = navigate_json_value(document, pointer.segments())?;
    merge_values(target, fragment, arrays);
    Ok(())
}
