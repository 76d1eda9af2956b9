//! In-memory file store for synthesis
//!
//! Every generated file lives here until the final commit. Files are keyed by
//! normalized relative path and hold either literal text lines or a
//! structured document. The store is ordered by path, so iterating it yields
//! the same sequence on every run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::debug;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::patch::{self, ArrayMerge, PatchOperation};
use crate::path;

/// Serialization format of a structured document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Pretty-printed JSON with two-space indentation
    Json,
    /// YAML, as used by CI workflow definitions
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension. Anything other than `.yml` or
    /// `.yaml` is JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("yml") | Some("yaml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

/// The content of a virtual file. Exactly one representation is active.
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// Literal text, one entry per line
    Lines(Vec<String>),
    /// A tree of mappings, sequences and scalars
    Document {
        format: DocumentFormat,
        value: JsonValue,
    },
}

/// Represents a virtual file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub content: FileContent,
}

impl File {
    /// Create a text file from lines
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: FileContent::Lines(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Create a structured file
    pub fn document(format: DocumentFormat, value: JsonValue) -> Self {
        Self {
            content: FileContent::Document { format, value },
        }
    }

    /// Create a JSON document
    pub fn json(value: JsonValue) -> Self {
        Self::document(DocumentFormat::Json, value)
    }

    /// Create a YAML document
    pub fn yaml(value: JsonValue) -> Self {
        Self::document(DocumentFormat::Yaml, value)
    }

    /// Short name of the active representation
    pub fn kind(&self) -> &'static str {
        match &self.content {
            FileContent::Lines(_) => "lines",
            FileContent::Document {
                format: DocumentFormat::Json,
                ..
            } => "json",
            FileContent::Document {
                format: DocumentFormat::Yaml,
                ..
            } => "yaml",
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self.content, FileContent::Document { .. })
    }

    pub fn as_document(&self) -> Option<&JsonValue> {
        match &self.content {
            FileContent::Document { value, .. } => Some(value),
            FileContent::Lines(_) => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut JsonValue> {
        match &mut self.content {
            FileContent::Document { value, .. } => Some(value),
            FileContent::Lines(_) => None,
        }
    }

    /// Render the file to the bytes that will be written.
    ///
    /// Output is deterministic: text lines are joined with `\n`, JSON is
    /// pretty-printed, and every file ends with a newline.
    pub fn render(&self) -> Result<Vec<u8>> {
        let text = match &self.content {
            FileContent::Lines(lines) => lines.join("\n"),
            FileContent::Document {
                format: DocumentFormat::Json,
                value,
            } => serde_json::to_string_pretty(value)?,
            FileContent::Document {
                format: DocumentFormat::Yaml,
                value,
            } => serde_yaml::to_string(value)?,
        };
        Ok(ensure_trailing_newline(text).into_bytes())
    }
}

fn ensure_trailing_newline(mut content: String) -> String {
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

fn key_of<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    path::to_key(&path.as_ref().to_string_lossy())
}

fn display_key(key: &Path) -> String {
    key.to_string_lossy().into_owned()
}

/// In-memory store of pending files, one per synthesis run
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    /// Files stored as normalized path -> file mapping
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let key = key_of(path)?;
        if self.files.insert(key.clone(), file).is_some() {
            debug!("Replaced {}", key.display());
        }
        Ok(())
    }

    /// Add a JSON or YAML document, choosing the format from the extension
    pub fn add_document<P: AsRef<Path>>(&mut self, path: P, value: JsonValue) -> Result<()> {
        let format = DocumentFormat::from_path(path.as_ref());
        self.add_file(path, File::document(format, value))
    }

    /// Store `lines` as a text file at `path`, replacing any prior content.
    ///
    /// The path becomes text-typed: a later patch against it fails with
    /// `Error::TypeMismatch`.
    pub fn write_lines<P, I, S>(&mut self, path: P, lines: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_file(path, File::lines(lines))
    }

    /// Append `lines` to the text file at `path`, creating it if absent.
    ///
    /// Existing lines are kept. A document at `path` is an
    /// `Error::TypeMismatch` and stays untouched.
    pub fn append_lines<P, I, S>(&mut self, path: P, lines: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key_of(path)?;
        let file = self
            .files
            .entry(key.clone())
            .or_insert_with(|| File::lines(Vec::<String>::new()));
        let kind = file.kind();
        match &mut file.content {
            FileContent::Lines(existing) => {
                let before = existing.len();
                existing.extend(lines.into_iter().map(Into::into));
                debug!(
                    "Appended {} line(s) to {}",
                    existing.len() - before,
                    key.display()
                );
                Ok(())
            }
            FileContent::Document { .. } => Err(Error::TypeMismatch {
                file: display_key(&key),
                expected: "lines".to_string(),
                found: kind.to_string(),
            }),
        }
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        key_of(path).ok().and_then(|key| self.files.get(&key))
    }

    /// Get a mutable file by path
    pub fn get_file_mut<P: AsRef<Path>>(&mut self, path: P) -> Option<&mut File> {
        match key_of(path) {
            Ok(key) => self.files.get_mut(&key),
            Err(_) => None,
        }
    }

    /// Remove a file. Removing a path that is not present is a no-op.
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Option<File>> {
        let key = key_of(path)?;
        let removed = self.files.remove(&key);
        if removed.is_none() {
            debug!("Nothing to remove at {}", key.display());
        }
        Ok(removed)
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.get_file(path).is_some()
    }

    /// List all file paths in order
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// List files matching a glob pattern
    pub fn list_files_glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
        Ok(self
            .files
            .keys()
            .filter(|file_path| pattern.matches(&file_path.to_string_lossy()))
            .cloned()
            .collect())
    }

    /// Borrow the structured document at `path` mutably.
    ///
    /// # Errors
    ///
    /// `Error::PathNotFound` if no file is registered at `path`,
    /// `Error::TypeMismatch` if the file holds text lines.
    pub fn document_mut<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut JsonValue> {
        let key = key_of(path)?;
        let file = self
            .files
            .get_mut(&key)
            .ok_or_else(|| Error::PathNotFound {
                file: display_key(&key),
                path: String::new(),
            })?;
        let kind = file.kind();
        file.as_document_mut().ok_or_else(|| Error::TypeMismatch {
            file: display_key(&key),
            expected: "structured document".to_string(),
            found: kind.to_string(),
        })
    }

    /// Apply patch operations, in order, to the document at `path`.
    ///
    /// Either every operation applies or the document is left unchanged.
    pub fn apply_patch<P: AsRef<Path>>(
        &mut self,
        path: P,
        operations: &[PatchOperation],
    ) -> Result<()> {
        let name = display_key(&key_of(path.as_ref())?);
        let document = self.document_mut(path)?;
        patch::apply_patch(document, operations).map_err(|err| err.in_file(&name))?;
        debug!("Applied {} patch operation(s) to {}", operations.len(), name);
        Ok(())
    }

    /// Deep-merge `fragment` into the document at `path`, at the structural
    /// path `at`. Missing intermediate objects are created.
    pub fn merge_document<P: AsRef<Path>>(
        &mut self,
        path: P,
        at: &str,
        fragment: &JsonValue,
        arrays: ArrayMerge,
    ) -> Result<()> {
        let name = display_key(&key_of(path.as_ref())?);
        let document = self.document_mut(path)?;
        patch::merge_at(document, at, fragment, arrays).map_err(|err| err.in_file(&name))
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs, ordered by path
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }
}
