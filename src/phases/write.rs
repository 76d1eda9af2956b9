//! Phase 3: Writing to Disk
//!
//! This is the final phase of a synthesis run and its only externally
//! observable side effect: every file in the store is rendered and written to
//! a `Destination`.
//!
//! ## Process
//!
//! 1.  **Render**: Each file is rendered to bytes (lines joined, documents
//!     serialized).
//!
//! 2.  **Write**: Files are written in path order. A failure does not stop
//!     the pass; the remaining files are still attempted.
//!
//! 3.  **Report**: If anything failed, a single `Error::Commit` lists the
//!     paths that were written and the paths that were not. Nothing is rolled
//!     back. Synthesis is idempotent, so re-running repairs the output.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Where committed files go.
pub trait Destination {
    /// Persist `contents` at the relative path `path`.
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Writes files under a root directory on the host filesystem
#[derive(Debug, Clone)]
pub struct DiskDestination {
    root: PathBuf,
}

impl DiskDestination {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Destination for DiskDestination {
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, contents)
    }
}

/// Collects committed files in memory, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&[u8]> {
        self.files.get(path.as_ref()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &Vec<u8>)> {
        self.files.iter()
    }
}

impl Destination for MemoryDestination {
    fn write(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Paths written, in commit order
    pub written: Vec<PathBuf>,
}

/// Write every file of `final_fs` to `destination`.
///
/// # Errors
///
/// `Error::Commit` when at least one file could not be rendered or written.
pub fn commit<D: Destination + ?Sized>(final_fs: &MemoryFS, destination: &mut D) -> Result<CommitReport> {
    let mut written = Vec::new();
    let mut failed = Vec::new();

    for (relative_path, file) in final_fs.files() {
        let outcome = file
            .render()
            .map_err(|err| err.to_string())
            .and_then(|bytes| {
                destination
                    .write(relative_path, &bytes)
                    .map_err(|err| err.to_string())
            });

        match outcome {
            Ok(()) => {
                debug!("Wrote {}", relative_path.display());
                written.push(relative_path.clone());
            }
            Err(reason) => {
                warn!("Failed to write {}: {}", relative_path.display(), reason);
                failed.push((relative_path.clone(), reason));
            }
        }
    }

    if failed.is_empty() {
        Ok(CommitReport { written })
    } else {
        Err(Error::Commit { written, failed })
    }
}

/// Execute Phase 3: write the final filesystem under `output_path`
pub fn execute(final_fs: &MemoryFS, output_path: &Path) -> Result<CommitReport> {
    commit(final_fs, &mut DiskDestination::new(output_path))
}

/// How a generated file compares with what is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Not on disk yet
    Added,
    /// On disk with different content
    Modified,
    /// On disk with identical content
    Unchanged,
}

/// A generated file and its status against the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub status: ChangeStatus,
}

/// Compare the rendered store with the files under `output_path`.
pub fn diff(final_fs: &MemoryFS, output_path: &Path) -> Result<Vec<FileChange>> {
    let mut changes = Vec::with_capacity(final_fs.len());

    for (relative_path, file) in final_fs.files() {
        let rendered = file.render()?;
        let status = match fs::read(output_path.join(relative_path)) {
            Ok(existing) if existing == rendered => ChangeStatus::Unchanged,
            Ok(_) => ChangeStatus::Modified,
            Err(err) if err.kind() == io::ErrorKind::NotFound => ChangeStatus::Added,
            Err(err) => return Err(Error::Io(err)),
        };
        changes.push(FileChange {
            path: relative_path.clone(),
            status,
        });
    }

    Ok(changes)
}
