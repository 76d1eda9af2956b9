//! # Configuration Schema and Parsing
//!
//! This module defines the declarative input of a synthesis run, normally read
//! from `.projsynth.yaml`, and the logic for parsing and validating it.
//!
//! ## Layout
//!
//! ```yaml
//! project:
//!   name: my-lib
//!   description: A library
//! defaults:
//!   eslint: false
//! dependencies:
//!   dev: ["typescript@3.9.5"]
//! overrides:
//!   dev: ["typescript@3.9.5", "eslint@8.16.0"]
//! operations:
//!   - remove: { path: .eslintrc.json }
//!   - lines: { path: .npmignore, lines: ["/src"] }
//!   - append: { path: .gitignore, lines: ["!/package-lock.json"] }
//!   - patch:
//!       path: package.json
//!       ops:
//!         - { op: add, path: /scripts/lint, value: eslint . }
//!   - merge: { path: tsconfig.json, at: compilerOptions, value: { strict: true } }
//! ```
//!
//! - **`project`**: name and metadata written into the manifest.
//! - **`defaults`**: toggles for the optional default files.
//! - **`dependencies`** / **`overrides`**: base and pinned dependency lists,
//!   by kind (`runtime`, `dev`, `peer`).
//! - **`operations`**: file operations, applied in the order written.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::dependencies::{DependencyKind, DependencySpec};
use crate::error::{Error, Result};
use crate::patch::{ArrayMerge, PatchOperation, Pointer};
use crate::path;
use crate::template::ProjectOptions;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".projsynth.yaml";

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Package name written into the manifest
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_license")]
    pub license: String,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_license() -> String {
    "Apache-2.0".to_string()
}

fn enabled() -> bool {
    true
}

fn default_node_version() -> String {
    "18.x".to_string()
}

/// Toggles for the optional default files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "enabled")]
    pub typescript: bool,
    #[serde(default = "enabled")]
    pub eslint: bool,
    #[serde(default = "enabled")]
    pub github: bool,
    #[serde(default = "default_node_version", rename = "node-version", alias = "node_version")]
    pub node_version: String,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            typescript: true,
            eslint: true,
            github: true,
            node_version: default_node_version(),
        }
    }
}

/// Dependency lists by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyLists {
    #[serde(default)]
    pub runtime: Vec<DependencySpec>,
    #[serde(default)]
    pub dev: Vec<DependencySpec>,
    #[serde(default)]
    pub peer: Vec<DependencySpec>,
}

impl DependencyLists {
    pub fn get(&self, kind: DependencyKind) -> &[DependencySpec] {
        match kind {
            DependencyKind::Runtime => &self.runtime,
            DependencyKind::Dev => &self.dev,
            DependencyKind::Peer => &self.peer,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.dev.is_empty() && self.peer.is_empty()
    }
}

/// Remove operator configuration
///
/// Exactly one of `path` and `patterns` must be given. Removing a file that is
/// not present is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveOp {
    /// A single file to remove
    #[serde(default)]
    pub path: Option<String>,
    /// Glob patterns matching files to remove
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Text file operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinesOp {
    /// File to write
    pub path: String,
    /// Content, one entry per line
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Append operator configuration
///
/// Adds lines to the end of a text file, creating it if absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendOp {
    /// File to extend
    pub path: String,
    /// Lines to add after the existing content
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Patch operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOp {
    /// Document to patch
    pub path: String,
    /// Skip the operation when the file is absent instead of failing
    #[serde(default)]
    pub optional: bool,
    /// Patch operations, applied in order
    pub ops: Vec<PatchOperation>,
}

/// Merge operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOp {
    /// Document to merge into
    pub path: String,
    /// Structural path inside the document (merges at the root if omitted)
    #[serde(default)]
    pub at: String,
    /// Fragment to merge
    pub value: JsonValue,
    /// How arrays present on both sides are combined
    #[serde(default)]
    pub arrays: ArrayMerge,
    /// Skip the operation when the file is absent instead of failing
    #[serde(default)]
    pub optional: bool,
}

/// All possible file operations in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operation {
    /// Remove generated files.
    Remove { remove: RemoveOp },
    /// Write a text file from lines.
    Lines { lines: LinesOp },
    /// Add lines to the end of a text file.
    Append { append: AppendOp },
    /// Apply structural patch operations to a document.
    Patch { patch: PatchOp },
    /// Deep-merge a fragment into a document.
    Merge { merge: MergeOp },
}

impl Operation {
    /// Operation name as written in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Remove { .. } => "remove",
            Operation::Lines { .. } => "lines",
            Operation::Append { .. } => "append",
            Operation::Patch { .. } => "patch",
            Operation::Merge { .. } => "merge",
        }
    }
}

/// The complete declarative input of a synthesis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
    /// Base dependencies, merged over the template's own
    #[serde(default)]
    pub dependencies: DependencyLists,
    /// Pinned overrides, merged last
    #[serde(default)]
    pub overrides: DependencyLists,
    /// File operations, executed in the order they are defined
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Config {
    /// Options for building the base project.
    pub fn project_options(&self) -> ProjectOptions {
        ProjectOptions {
            name: self.project.name.clone(),
            description: self.project.description.clone(),
            version: self.project.version.clone(),
            license: self.project.license.clone(),
            typescript: self.defaults.typescript,
            eslint: self.defaults.eslint,
            github: self.defaults.github,
            node_version: self.defaults.node_version.clone(),
        }
    }

    /// Check everything that can be checked without building the project:
    /// names, file paths, glob patterns and structural paths.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "project name must not be empty".to_string(),
                hint: Some("Set 'name:' under 'project:'".to_string()),
            });
        }

        for (index, operation) in self.operations.iter().enumerate() {
            validate_operation(operation).map_err(|err| Error::ConfigParse {
                message: format!("operation {} ({}): {}", index + 1, operation.name(), err),
                hint: None,
            })?;
        }

        Ok(())
    }
}

fn validate_operation(operation: &Operation) -> Result<()> {
    match operation {
        Operation::Remove { remove } => match (&remove.path, remove.patterns.is_empty()) {
            (Some(file), true) => path::normalize(file).map(|_| ()),
            (None, false) => remove
                .patterns
                .iter()
                .try_for_each(|pattern| path::validate_pattern(pattern)),
            _ => Err(Error::ConfigParse {
                message: "remove needs exactly one of 'path' or 'patterns'".to_string(),
                hint: None,
            }),
        },
        Operation::Lines { lines } => path::normalize(&lines.path).map(|_| ()),
        Operation::Append { append } => path::normalize(&append.path).map(|_| ()),
        Operation::Patch { patch } => {
            path::normalize(&patch.path)?;
            for op in &patch.ops {
                Pointer::parse(op.path())?;
                if let PatchOperation::Move { from, .. } | PatchOperation::Copy { from, .. } = op {
                    Pointer::parse(from)?;
                }
            }
            Ok(())
        }
        Operation::Merge { merge } => {
            path::normalize(&merge.path)?;
            Pointer::parse(&merge.at).map(|_| ())
        }
    }
}

/// Parse a YAML string into a validated `Config`.
pub fn parse(yaml_content: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml_content).map_err(|err| Error::ConfigParse {
        message: err.to_string(),
        hint: hint_for(yaml_content),
    })?;
    check_operation_keys(yaml_content)?;
    config.validate()?;
    Ok(config)
}

/// Every operation entry names exactly one operation. Untagged matching would
/// otherwise take the first recognised key and ignore the rest.
fn check_operation_keys(yaml_content: &str) -> Result<()> {
    use serde_yaml::Value;

    let Ok(Value::Mapping(root)) = serde_yaml::from_str::<Value>(yaml_content) else {
        return Ok(());
    };
    let Some(operations) = root.get("operations").and_then(Value::as_sequence) else {
        return Ok(());
    };

    for (index, entry) in operations.iter().enumerate() {
        let Some(map) = entry.as_mapping() else {
            continue;
        };
        if map.len() > 1 {
            let keys: Vec<&str> = map.keys().filter_map(Value::as_str).collect();
            return Err(Error::ConfigParse {
                message: format!(
                    "operation {} has several keys ({})",
                    index + 1,
                    keys.join(", ")
                ),
                hint: Some("Write each operation as its own list entry".to_string()),
            });
        }
    }

    Ok(())
}

/// Read and parse a configuration file.
pub fn from_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|err| Error::ConfigParse {
        message: format!("Failed to read {}: {}", path.display(), err),
        hint: None,
    })?;
    parse(&content)
}

/// Look at the raw YAML for common mistakes and suggest a fix.
fn hint_for(yaml_content: &str) -> Option<String> {
    use serde_yaml::Value;

    let raw: Value = serde_yaml::from_str(yaml_content).ok()?;
    let Value::Mapping(root) = raw else {
        return Some("The configuration must be a mapping with a 'project:' key".to_string());
    };

    if !root.contains_key("project") {
        return Some("Add a 'project:' section with at least 'name:'".to_string());
    }

    let operations = root.get("operations")?.as_sequence()?;
    for (index, entry) in operations.iter().enumerate() {
        let Some(map) = entry.as_mapping() else {
            return Some(format!("Operation {} must be a mapping", index + 1));
        };
        let Some(key) = map.keys().next().and_then(Value::as_str) else {
            return Some(format!("Operation {} is empty", index + 1));
        };
        if !matches!(key, "remove" | "lines" | "append" | "patch" | "merge") {
            return Some(format!(
                "Unknown operation '{}'; expected one of remove, lines, append, patch, merge",
                key
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FULL: &str = r#"
project:
  name: my-lib
  description: A library
defaults:
  eslint: false
dependencies:
  dev: ["typescript@3.9.5"]
overrides:
  dev:
    - typescript@3.9.5
    - name: eslint
      version: 8.16.0
operations:
  - remove: { path: .eslintrc.json }
  - remove: { patterns: ["*.tmp"] }
  - lines: { path: .npmignore, lines: ["/src", "/test"] }
  - append: { path: .gitignore, lines: ["!/package-lock.json"] }
  - patch:
      path: .github/workflows/build.yml
      optional: true
      ops:
        - { op: replace, path: /jobs/build/steps/3/run, value: npm run build }
  - merge: { path: tsconfig.json, at: compilerOptions, value: { strict: true }, arrays: append }
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.project.name, "my-lib");
        assert_eq!(config.project.version, "0.0.0");
        assert!(!config.defaults.eslint);
        assert!(config.defaults.github);
        assert_eq!(config.dependencies.dev.len(), 1);
        assert_eq!(
            config.overrides.get(DependencyKind::Dev),
            &[
                DependencySpec::new("typescript", "3.9.5"),
                DependencySpec::new("eslint", "8.16.0")
            ]
        );

        let names: Vec<_> = config.operations.iter().map(Operation::name).collect();
        assert_eq!(
            names,
            vec!["remove", "remove", "lines", "append", "patch", "merge"]
        );

        match &config.operations[3] {
            Operation::Append { append } => {
                assert_eq!(append.path, ".gitignore");
                assert_eq!(append.lines, vec!["!/package-lock.json"]);
            }
            other => panic!("unexpected operation: {other:?}"),
        }
        match &config.operations[4] {
            Operation::Patch { patch } => {
                assert!(patch.optional);
                assert_eq!(
                    patch.ops,
                    vec![PatchOperation::replace(
                        "/jobs/build/steps/3/run",
                        json!("npm run build")
                    )]
                );
            }
            other => panic!("unexpected operation: {other:?}"),
        }
        match &config.operations[5] {
            Operation::Merge { merge } => {
                assert_eq!(merge.at, "compilerOptions");
                assert_eq!(merge.arrays, ArrayMerge::Append);
                assert_eq!(merge.value, json!({"strict": true}));
            }
            other => panic!("unexpected operation: {other:?}"),
        }
    }

    #[test]
    fn test_minimal_config() {
        let config = parse("project:\n  name: tiny\n").unwrap();
        assert!(config.operations.is_empty());
        assert!(config.dependencies.is_empty());
        assert!(config.defaults.typescript);
        assert_eq!(config.project_options().name, "tiny");
    }

    #[test]
    fn test_missing_project_has_hint() {
        let err = parse("operations: []\n").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint: Add a 'project:' section"));
    }

    #[test]
    fn test_unknown_operation_has_hint() {
        let yaml = "project:\n  name: x\noperations:\n  - rename: { from: a, to: b }\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("Unknown operation 'rename'"));
    }

    #[test]
    fn test_operation_with_two_keys_is_rejected() {
        let yaml = r#"
project:
  name: x
operations:
  - remove: { path: .eslintrc.json }
    lines: { path: .npmignore, lines: ["/src"] }
"#;
        let err = parse(yaml).unwrap_err();
        let display = err.to_string();
        assert!(display.contains("operation 1 has several keys (remove, lines)"));
        assert!(display.contains("hint: Write each operation as its own list entry"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = parse("project:\n  name: ''\n").unwrap_err();
        assert!(err.to_string().contains("project name must not be empty"));
    }

    #[test]
    fn test_remove_needs_path_or_patterns() {
        let yaml = "project:\n  name: x\noperations:\n  - remove: {}\n";
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("operation 1 (remove)"));
    }

    #[test]
    fn test_invalid_pointer_is_rejected() {
        let yaml = r#"
project:
  name: x
operations:
  - patch:
      path: package.json
      ops:
        - { op: remove, path: "/a~9" }
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("operation 1 (patch)"));
    }

    #[test]
    fn test_escaping_path_is_rejected() {
        let yaml = "project:\n  name: x\noperations:\n  - lines: { path: ../outside, lines: [] }\n";
        assert!(parse(yaml).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_file(Path::new("/nonexistent/.projsynth.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
