//! Phase 2: Applying Declared Operations
//!
//! Runs the configuration's `operations` list against the project, in the
//! order written. There is a single pass: a `remove` listed after a `patch`
//! on the same file runs after it, and a `lines` entry listed after a
//! `remove` recreates the file.
//!
//! The first failing operation aborts the run. Patches are atomic per
//! operation, so the failing one leaves its document untouched.

use std::path::PathBuf;

use log::{debug, info};

use crate::config::{AppendOp, LinesOp, MergeOp, Operation, PatchOp, RemoveOp};
use crate::error::Result;
use crate::project::Project;

/// Execute Phase 2 of the pipeline.
pub fn execute(project: &mut Project, operations: &[Operation]) -> Result<()> {
    for (index, operation) in operations.iter().enumerate() {
        debug!("Operation {}: {}", index + 1, operation.name());
        apply_operation(project, operation)?;
    }
    Ok(())
}

/// Apply a single operation to the project
pub fn apply_operation(project: &mut Project, operation: &Operation) -> Result<()> {
    match operation {
        Operation::Remove { remove } => apply_remove(project, remove),
        Operation::Lines { lines } => apply_lines(project, lines),
        Operation::Append { append } => apply_append(project, append),
        Operation::Patch { patch } => apply_patch(project, patch),
        Operation::Merge { merge } => apply_merge(project, merge),
    }
}

fn apply_remove(project: &mut Project, op: &RemoveOp) -> Result<()> {
    let mut targets: Vec<PathBuf> = Vec::new();
    if let Some(path) = &op.path {
        targets.push(PathBuf::from(path));
    }
    for pattern in &op.patterns {
        targets.extend(project.files().list_files_glob(pattern)?);
    }

    let mut removed = 0;
    for target in targets {
        if project.remove_file(&target)? {
            removed += 1;
        }
    }
    info!("Removed {} file(s)", removed);
    Ok(())
}

fn apply_lines(project: &mut Project, op: &LinesOp) -> Result<()> {
    project.write_lines(&op.path, op.lines.iter().cloned())?;
    info!("Wrote {} ({} lines)", op.path, op.lines.len());
    Ok(())
}

fn apply_append(project: &mut Project, op: &AppendOp) -> Result<()> {
    project.append_lines(&op.path, op.lines.iter().cloned())?;
    info!("Appended {} line(s) to {}", op.lines.len(), op.path);
    Ok(())
}

fn apply_patch(project: &mut Project, op: &PatchOp) -> Result<()> {
    if op.optional {
        project.try_apply_patch(&op.path, &op.ops)?;
        return Ok(());
    }
    project.apply_patch(&op.path, &op.ops)?;
    info!("Patched {}", op.path);
    Ok(())
}

fn apply_merge(project: &mut Project, op: &MergeOp) -> Result<()> {
    if op.optional && !project.files().exists(&op.path) {
        info!("Skipping merge for optional file {}", op.path);
        return Ok(());
    }
    project.merge(&op.path, &op.at, &op.value, op.arrays)?;
    info!("Merged into {}", op.path);
    Ok(())
}
