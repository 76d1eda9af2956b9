//! Structural paths into JSON-shaped documents
//!
//! Two notations are accepted:
//!
//! - JSON Pointer (RFC 6901) when the path starts with `/` or is empty:
//!   `/jobs/build/steps/3/run`, with `~1` for `/` and `~0` for `~` inside keys.
//! - Dotted notation otherwise: `jobs.build.steps[3].run`, with bracketed
//!   quoted keys (`config["special.key"]`) and `\.` escapes.
//!
//! Both parse into the same sequence of `PathSegment`s. A segment is resolved
//! against whatever container it meets during the walk: on a mapping it is a
//! key, on a sequence it is an index.

use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

/// Represents a segment in a path expression for navigating nested structures
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A named key for accessing object/map members
    Key(String),
    /// A numeric index for accessing array/sequence elements
    Index(usize),
}

impl PathSegment {
    /// The segment as a mapping key.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(key) => Cow::Borrowed(key),
            PathSegment::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }

    /// The segment as a sequence index, if it is one.
    ///
    /// Keys only count as indices when written canonically (`"3"`, not `"03"`).
    pub fn index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(idx) => Some(*idx),
            PathSegment::Key(key) => parse_index(key),
        }
    }

    /// Whether the segment is the JSON Pointer "past the end" marker `-`.
    pub fn is_append(&self) -> bool {
        matches!(self, PathSegment::Key(key) if key == "-")
    }
}

fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// A parsed structural path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pointer {
    raw: String,
    segments: Vec<PathSegment>,
}

impl Pointer {
    /// Parse a path in either JSON Pointer or dotted notation.
    ///
    /// # Examples
    ///
    /// ```
    /// use projsynth::patch::{Pointer, PathSegment};
    ///
    /// let pointer = Pointer::parse("/jobs/build/steps/3").unwrap();
    /// assert_eq!(pointer.segments().len(), 4);
    /// assert_eq!(pointer.segments()[3], PathSegment::Index(3));
    ///
    /// let dotted = Pointer::parse("jobs.build.steps[3]").unwrap();
    /// assert_eq!(dotted.segments(), pointer.segments());
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let segments = if path.is_empty() || path.starts_with('/') {
            parse_json_pointer(path)?
        } else {
            parse_path(path)
        };
        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The root of the document.
    pub fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Split into the parent segments and the final segment.
    pub fn split_last(&self) -> Option<(&[PathSegment], &PathSegment)> {
        self.segments
            .split_last()
            .map(|(last, parent)| (parent, last))
    }

    /// Whether `self` is a strict ancestor of `other`.
    pub fn is_proper_prefix_of(&self, other: &Pointer) -> bool {
        self.segments.len() < other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a.key() == b.key())
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_json_pointer(pointer: &str) -> Result<Vec<PathSegment>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for token in pointer[1..].split('/') {
        let mut unescaped = String::with_capacity(token.len());
        let mut chars = token.chars();
        while let Some(ch) = chars.next() {
            if ch != '~' {
                unescaped.push(ch);
                continue;
            }
            match chars.next() {
                Some('0') => unescaped.push('~'),
                Some('1') => unescaped.push('/'),
                _ => {
                    return Err(Error::InvalidPointer {
                        pointer: pointer.to_string(),
                        message: "'~' must be followed by '0' or '1'".to_string(),
                    });
                }
            }
        }

        match parse_index(&unescaped) {
            Some(idx) => segments.push(PathSegment::Index(idx)),
            None => segments.push(PathSegment::Key(unescaped)),
        }
    }

    Ok(segments)
}

/// Parse a dotted path string into segments
///
/// Supports:
/// - Dot notation: `foo.bar.baz`
/// - Bracket notation: `foo["bar"]` or `foo['bar']`
/// - Array indices: `foo[0]` or `items[1].name`
/// - Escaped characters: `foo\.bar` (literal dot)
/// - Mixed: `servers[0].config["special.key"]`
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    if path.trim().is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => {
                escaped = true;
            }
            '.' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }

                match chars.peek().copied() {
                    Some(quote_char @ ('"' | '\'')) => {
                        chars.next();
                        let mut key = String::new();
                        let mut bracket_escaped = false;

                        while let Some(ch) = chars.next() {
                            if bracket_escaped {
                                key.push(ch);
                                bracket_escaped = false;
                            } else if ch == '\\' {
                                bracket_escaped = true;
                            } else if ch == quote_char {
                                if chars.peek() == Some(&']') {
                                    chars.next();
                                    break;
                                }
                                key.push(ch);
                            } else {
                                key.push(ch);
                            }
                        }

                        segments.push(PathSegment::Key(key));
                    }
                    _ => {
                        let mut bracket_content = String::new();
                        for next_ch in chars.by_ref() {
                            if next_ch == ']' {
                                break;
                            }
                            bracket_content.push(next_ch);
                        }

                        let trimmed = bracket_content.trim();
                        if let Ok(idx) = trimmed.parse::<usize>() {
                            segments.push(PathSegment::Index(idx));
                        } else if !trimmed.is_empty() {
                            segments.push(PathSegment::Key(trimmed.to_string()));
                        }
                    }
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Key(current));
    }

    segments
}
