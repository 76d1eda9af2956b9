//! # Project Synthesis Library
//!
//! This library builds a project's configuration files (package manifest,
//! compiler and lint settings, CI workflow, ignore files) from a small
//! declarative description. Everything is staged in memory and only written
//! out once every mutation has validated.
//!
//! ## Quick Example
//!
//! ```
//! use projsynth::config;
//! use projsynth::phases::orchestrator;
//! use projsynth::phases::write::MemoryDestination;
//!
//! let config = config::parse(r#"
//! project:
//!   name: my-lib
//! overrides:
//!   dev: ["typescript@3.9.5"]
//! operations:
//!   - patch:
//!       path: package.json
//!       ops:
//!         - { op: add, path: /scripts/lint, value: "eslint ." }
//! "#).unwrap();
//!
//! let project = orchestrator::build(&config).unwrap();
//! let manifest = project.find_file("package.json").unwrap();
//! assert_eq!(manifest["devDependencies"]["typescript"], "3.9.5");
//!
//! let mut destination = MemoryDestination::new();
//! project.synth(&mut destination).unwrap();
//! assert!(destination.get("package.json").is_some());
//! ```
//!
//! ## Core Concepts
//!
//! - **In-Memory Filesystem (`filesystem`)**: The store of pending files, each
//!   either text lines or a structured JSON/YAML document.
//! - **Patches (`patch`)**: Ordered `add`/`replace`/`remove`/`test`/`move`/`copy`
//!   operations addressed by JSON Pointer, plus deep merge of fragments.
//! - **Dependencies (`dependencies`)**: `name@version` declarations and the
//!   override resolution that pins them.
//! - **Projects (`project`, `template`)**: The default file set and the hooks
//!   used to customize it.
//! - **Configuration (`config`)**: The `.projsynth.yaml` schema.
//! - **Phases (`phases`)**: Build the project, apply operations, commit files.

pub mod config;
pub mod dependencies;
pub mod error;
pub mod filesystem;
pub mod output;
pub mod patch;
pub mod path;
pub mod phases;
pub mod project;
pub mod template;

#[cfg(test)]
mod path_proptest;
