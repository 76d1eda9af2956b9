//! Orchestrator for a complete synthesis run
//!
//! This module coordinates the phases to provide a clean API for building a
//! project from its configuration and, optionally, writing it to disk.

use std::path::Path;

use log::info;

use super::{operations, write};
use crate::config::Config;
use crate::dependencies::{resolve, DependencyKind};
use crate::error::Result;
use crate::filesystem::MemoryFS;
use crate::project::Project;

/// Build the project described by `config` without writing anything.
///
/// 1. Create the base project from the configured options
/// 2. Merge each dependency kind: base list, then pinned overrides
/// 3. Apply the declared operations in order
pub fn build(config: &Config) -> Result<Project> {
    // Phase 1: Base Project
    let mut project = Project::new(&config.project_options())?;

    for kind in DependencyKind::ALL {
        let base = config.dependencies.get(kind);
        let overrides = config.overrides.get(kind);
        if base.is_empty() && overrides.is_empty() {
            continue;
        }
        project.add_dependencies(kind, &resolve(base, overrides))?;
    }

    // Phase 2: Operations
    operations::execute(&mut project, &config.operations)?;

    Ok(project)
}

/// Execute the complete synthesis run (Phases 1-3)
///
/// If `output_path` is `None`, returns the final MemoryFS without writing to disk.
/// If `output_path` is `Some(path)`, writes to disk and returns the MemoryFS.
pub fn execute_synth(config: &Config, output_path: Option<&Path>) -> Result<MemoryFS> {
    let final_fs = build(config)?.into_files();

    // Phase 3: Write to Disk (if output path provided)
    if let Some(output) = output_path {
        let report = write::execute(&final_fs, output)?;
        info!(
            "Wrote {} file(s) to {}",
            report.written.len(),
            output.display()
        );
    }

    Ok(final_fs)
}
