//! # Dependency Override Resolution
//!
//! Dependencies are `(name, version)` pairs. The version is an opaque string:
//! a semver range, a git URL with a pinned commit, a registry tag. It is
//! never parsed or validated, only compared and overwritten as a whole.
//!
//! `resolve` merges a base list with a list of pinned overrides. Overrides
//! always win on a name collision, but the name keeps the position where it
//! first appeared so a manifest's dependency block is not reordered when only
//! versions change. Names that only the overrides introduce are appended in
//! declaration order.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// Version used when a dependency is declared without one.
pub const ANY_VERSION: &str = "*";

/// A single dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencySpec {
    /// Package name, the uniqueness key within a list
    pub name: String,
    /// Version range, tag, or source locator
    pub version: String,
}

impl DependencySpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl FromStr for DependencySpec {
    type Err = Error;

    /// Parse `name@version`. Scoped names keep their leading `@`
    /// (`@types/node@^18`), and a bare name gets the `*` version.
    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let split_at = spec
            .char_indices()
            .skip(1)
            .find(|(_, ch)| *ch == '@')
            .map(|(idx, _)| idx);

        let (name, version) = match split_at {
            Some(idx) => (&spec[..idx], &spec[idx + 1..]),
            None => (spec, ANY_VERSION),
        };

        if name.is_empty() || name == "@" {
            return Err(Error::Dependency {
                spec: spec.to_string(),
                message: "missing package name".to_string(),
            });
        }
        if version.is_empty() {
            return Err(Error::Dependency {
                spec: spec.to_string(),
                message: "empty version after '@'".to_string(),
            });
        }

        Ok(Self::new(name, version))
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl<'de> Deserialize<'de> for DependencySpec {
    /// Accepts either `"name@version"` or `{name, version}`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Table {
                name: String,
                #[serde(default = "any_version")]
                version: String,
            },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Raw::Table { name, version } => Ok(Self::new(name, version)),
        }
    }
}

fn any_version() -> String {
    ANY_VERSION.to_string()
}

/// Which dependency block of the manifest a list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Runtime,
    Dev,
    Peer,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Runtime,
        DependencyKind::Dev,
        DependencyKind::Peer,
    ];

    /// The manifest key holding this kind of dependency.
    pub fn manifest_key(self) -> &'static str {
        match self {
            DependencyKind::Runtime => "dependencies",
            DependencyKind::Dev => "devDependencies",
            DependencyKind::Peer => "peerDependencies",
        }
    }
}

/// Merge `overrides` into `base`.
///
/// Pure function of its inputs. For each name the last declaration wins (base
/// in order, then overrides in order) and keeps its first-seen position.
///
/// # Examples
///
/// ```
/// use projsynth::dependencies::{resolve, DependencySpec};
///
/// let base = vec![DependencySpec::new("typescript", "3.9.5")];
/// let overrides = vec![
///     DependencySpec::new("typescript", "3.9.5"),
///     DependencySpec::new("eslint", "8.16.0"),
/// ];
/// let resolved = resolve(&base, &overrides);
/// assert_eq!(resolved, vec![
///     DependencySpec::new("typescript", "3.9.5"),
///     DependencySpec::new("eslint", "8.16.0"),
/// ]);
/// ```
pub fn resolve(base: &[DependencySpec], overrides: &[DependencySpec]) -> Vec<DependencySpec> {
    let mut resolved: Vec<DependencySpec> = Vec::with_capacity(base.len() + overrides.len());
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for spec in base.iter().chain(overrides.iter()) {
        match positions.get(spec.name.as_str()) {
            Some(&idx) => resolved[idx].version = spec.version.clone(),
            None => {
                positions.insert(spec.name.as_str(), resolved.len());
                resolved.push(spec.clone());
            }
        }
    }

    resolved
}

/// Read an ordered dependency list from a manifest's `{name: version}` block.
///
/// A missing block is an empty list. Non-string versions are kept as their
/// JSON text, since versions are opaque.
pub fn dependencies_from_manifest(manifest: &JsonValue, kind: DependencyKind) -> Vec<DependencySpec> {
    manifest
        .get(kind.manifest_key())
        .and_then(JsonValue::as_object)
        .map(|block| {
            block
                .iter()
                .map(|(name, version)| {
                    let version = match version {
                        JsonValue::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    DependencySpec::new(name.clone(), version)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Render a dependency list as an ordered `{name: version}` block.
pub fn dependencies_to_value(specs: &[DependencySpec]) -> JsonValue {
    let block: Map<String, JsonValue> = specs
        .iter()
        .map(|spec| (spec.name.clone(), JsonValue::String(spec.version.clone())))
        .collect();
    JsonValue::Object(block)
}
