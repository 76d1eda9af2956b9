//! # Base Project Synthesizer
//!
//! `Project` owns the run's `MemoryFS`. Creating one lays down the default
//! scaffolding (manifest, TypeScript config, lint config, CI workflow,
//! ignore file) according to `ProjectOptions`. After that the project exposes
//! the hooks the declarative phase uses: removing files, looking up
//! documents, adding dependencies, writing text files and patching or
//! merging documents. `synth` consumes the project and commits its files.
//!
//! Patches aimed at a missing file are an error. Callers that treat a file
//! as optional must check `find_file` first or use `try_apply_patch`.

use std::path::Path;

use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::dependencies::{
    dependencies_from_manifest, dependencies_to_value, resolve, DependencyKind, DependencySpec,
};
use crate::error::{Error, Result};
use crate::filesystem::{File, MemoryFS};
use crate::patch::{ArrayMerge, PatchOperation};
use crate::phases::write::{self, CommitReport, Destination};
use crate::template::{self, ProjectOptions};

/// A project being synthesized.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    description: String,
    fs: MemoryFS,
}

impl Project {
    /// Create a project with the default file set.
    pub fn new(options: &ProjectOptions) -> Result<Self> {
        let mut fs = MemoryFS::new();

        fs.add_file(
            template::MANIFEST_PATH,
            File::json(template::package_manifest(options)),
        )?;
        if options.typescript {
            fs.add_file(template::TSCONFIG_PATH, File::json(template::tsconfig()))?;
        }
        if options.eslint {
            fs.add_file(template::ESLINT_PATH, File::json(template::eslintrc()))?;
        }
        if options.github {
            fs.add_file(
                template::WORKFLOW_PATH,
                File::yaml(template::build_workflow(options)),
            )?;
        }
        fs.write_lines(template::GITIGNORE_PATH, template::gitignore_lines(options))?;

        let mut project = Self {
            name: options.name.clone(),
            description: options.description.clone(),
            fs,
        };
        project.add_dev_dependencies(&template::base_dev_dependencies(options))?;

        info!(
            "Initialized project '{}' with {} default files",
            project.name,
            project.fs.len()
        );
        Ok(project)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The pending file set.
    pub fn files(&self) -> &MemoryFS {
        &self.fs
    }

    /// Give up the project and keep only its file set.
    pub fn into_files(self) -> MemoryFS {
        self.fs
    }

    /// Remove a file if present. Returns whether something was removed.
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        Ok(self.fs.remove_file(path)?.is_some())
    }

    /// Look up a structured document. `None` when the file is missing or
    /// holds text lines.
    pub fn find_file<P: AsRef<Path>>(&self, path: P) -> Option<&JsonValue> {
        self.fs.get_file(path).and_then(File::as_document)
    }

    pub fn find_file_mut<P: AsRef<Path>>(&mut self, path: P) -> Option<&mut JsonValue> {
        self.fs.get_file_mut(path).and_then(File::as_document_mut)
    }

    /// Merge `specs` into the manifest's development dependencies.
    pub fn add_dev_dependencies(&mut self, specs: &[DependencySpec]) -> Result<()> {
        self.add_dependencies(DependencyKind::Dev, specs)
    }

    /// Merge `specs` into one of the manifest's dependency blocks.
    ///
    /// The block is read as the base list and `specs` act as overrides: a
    /// name already present keeps its position and takes the new version, new
    /// names are appended.
    pub fn add_dependencies(&mut self, kind: DependencyKind, specs: &[DependencySpec]) -> Result<()> {
        let manifest = self.fs.document_mut(template::MANIFEST_PATH)?;
        let base = dependencies_from_manifest(manifest, kind);
        let resolved = resolve(&base, specs);

        let map = manifest.as_object_mut().ok_or_else(|| Error::TypeMismatch {
            file: template::MANIFEST_PATH.to_string(),
            expected: "object".to_string(),
            found: "non-object document".to_string(),
        })?;
        debug!(
            "Resolved {} {} ({} base, {} declared)",
            resolved.len(),
            kind.manifest_key(),
            base.len(),
            specs.len()
        );
        map.insert(
            kind.manifest_key().to_string(),
            dependencies_to_value(&resolved),
        );
        Ok(())
    }

    /// Write a text file, replacing any prior content at `path`.
    pub fn write_lines<P, I, S>(&mut self, path: P, lines: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fs.write_lines(path, lines)
    }

    /// Append lines to a text file, keeping what is already there.
    pub fn append_lines<P, I, S>(&mut self, path: P, lines: I) -> Result<()>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fs.append_lines(path, lines)
    }

    /// Add ignore patterns after the default `.gitignore` entries.
    pub fn add_git_ignore<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fs.append_lines(template::GITIGNORE_PATH, patterns)
    }

    /// Apply patch operations to a document. Fails if the file is missing.
    pub fn apply_patch<P: AsRef<Path>>(&mut self, path: P, operations: &[PatchOperation]) -> Result<()> {
        self.fs.apply_patch(path, operations)
    }

    /// Apply patch operations only if the document exists.
    ///
    /// Returns `Ok(false)` when the file is absent. A file that exists but
    /// holds text lines is still a `TypeMismatch` error.
    pub fn try_apply_patch<P: AsRef<Path>>(
        &mut self,
        path: P,
        operations: &[PatchOperation],
    ) -> Result<bool> {
        if !self.fs.exists(path.as_ref()) {
            info!(
                "Skipping patch for optional file {}",
                path.as_ref().display()
            );
            return Ok(false);
        }
        self.fs.apply_patch(path, operations)?;
        Ok(true)
    }

    /// Deep-merge a fragment into a document, creating the path `at`.
    pub fn merge<P: AsRef<Path>>(
        &mut self,
        path: P,
        at: &str,
        fragment: &JsonValue,
        arrays: ArrayMerge,
    ) -> Result<()> {
        self.fs.merge_document(path, at, fragment, arrays)
    }

    /// Commit every file to `destination`.
    pub fn synth<D: Destination + ?Sized>(self, destination: &mut D) -> Result<CommitReport> {
        write::commit(&self.fs, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::write::MemoryDestination;
    use serde_json::json;

    fn project() -> Project {
        Project::new(&ProjectOptions::new("demo")).unwrap()
    }

    fn dev_dependencies(project: &Project) -> Vec<DependencySpec> {
        dependencies_from_manifest(
            project.find_file(template::MANIFEST_PATH).unwrap(),
            DependencyKind::Dev,
        )
    }

    #[test]
    fn test_default_files() {
        let project = project();
        let paths: Vec<_> = project
            .files()
            .list_files()
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            paths,
            vec![
                ".eslintrc.json",
                ".github/workflows/build.yml",
                ".gitignore",
                "package.json",
                "tsconfig.json"
            ]
        );
    }

    #[test]
    fn test_defaults_follow_options() {
        let options = ProjectOptions {
            eslint: false,
            github: false,
            ..ProjectOptions::new("slim")
        };
        let project = Project::new(&options).unwrap();
        assert!(project.find_file(template::ESLINT_PATH).is_none());
        assert!(project.find_file(template::WORKFLOW_PATH).is_none());
        assert!(project.find_file(template::TSCONFIG_PATH).is_some());
    }

    #[test]
    fn test_manifest_carries_metadata() {
        let options = ProjectOptions {
            description: "A demo".to_string(),
            ..ProjectOptions::new("demo")
        };
        let project = Project::new(&options).unwrap();
        let manifest = project.find_file("package.json").unwrap();
        assert_eq!(manifest["name"], json!("demo"));
        assert_eq!(manifest["description"], json!("A demo"));
        assert_eq!(project.name(), "demo");
        assert_eq!(project.description(), "A demo");
    }

    #[test]
    fn test_base_dev_dependencies_are_written() {
        let project = project();
        let names: Vec<_> = dev_dependencies(&project).into_iter().map(|d| d.name).collect();
        assert_eq!(names[0], "jest");
        assert!(names.contains(&"typescript".to_string()));
    }

    #[test]
    fn test_add_dev_dependencies_overrides_in_place() {
        let mut project = project();
        let before: Vec<_> = dev_dependencies(&project).into_iter().map(|d| d.name).collect();

        project
            .add_dev_dependencies(&[
                DependencySpec::new("typescript", "3.9.5"),
                DependencySpec::new("prettier", "^2"),
            ])
            .unwrap();

        let after = dev_dependencies(&project);
        let names: Vec<_> = after.iter().map(|d| d.name.clone()).collect();
        assert_eq!(&names[..before.len()], &before[..]);
        assert_eq!(names.last().unwrap(), "prettier");
        let typescript = after.iter().find(|d| d.name == "typescript").unwrap();
        assert_eq!(typescript.version, "3.9.5");
    }

    #[test]
    fn test_add_dependencies_without_manifest_fails() {
        let mut project = project();
        project.remove_file("package.json").unwrap();
        let err = project
            .add_dependencies(DependencyKind::Runtime, &[DependencySpec::new("zod", "^3")])
            .unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
    }

    #[test]
    fn test_remove_file_best_effort() {
        let mut project = project();
        let before = project.files().list_files();
        assert!(!project.remove_file("/nonexistent").unwrap());
        assert_eq!(project.files().list_files(), before);
        assert!(project.remove_file("/.eslintrc.json").unwrap());
    }

    #[test]
    fn test_add_git_ignore_keeps_defaults() {
        let mut project = project();
        project.add_git_ignore(["!/package-lock.json"]).unwrap();

        let mut expected = template::gitignore_lines(&ProjectOptions::new("demo"));
        expected.push("!/package-lock.json".to_string());
        assert_eq!(
            project.files().get_file(".gitignore").unwrap().content,
            crate::filesystem::FileContent::Lines(expected)
        );
    }

    #[test]
    fn test_append_lines_on_manifest_is_type_mismatch() {
        let mut project = project();
        let before = project.find_file("package.json").unwrap().clone();
        let err = project.append_lines("package.json", ["x"]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(project.find_file("package.json").unwrap(), &before);
    }

    #[test]
    fn test_find_file_ignores_text_files() {
        let project = project();
        assert!(project.find_file(".gitignore").is_none());
        assert!(project.files().exists(".gitignore"));
    }

    #[test]
    fn test_patch_after_write_lines_is_type_mismatch() {
        let mut project = project();
        project.write_lines("tsconfig.json", ["{}"]).unwrap();
        let err = project
            .apply_patch("tsconfig.json", &[PatchOperation::add("/x", json!(1))])
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_unguarded_patch_on_removed_file_fails() {
        let mut project = project();
        project.remove_file(template::WORKFLOW_PATH).unwrap();
        let ops = [PatchOperation::replace("/name", json!("ci"))];
        let err = project.apply_patch(template::WORKFLOW_PATH, &ops).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
    }

    #[test]
    fn test_try_apply_patch_skips_missing_file() {
        let mut project = project();
        project.remove_file(template::WORKFLOW_PATH).unwrap();
        let ops = [PatchOperation::replace("/name", json!("ci"))];
        assert!(!project.try_apply_patch(template::WORKFLOW_PATH, &ops).unwrap());
    }

    #[test]
    fn test_try_apply_patch_logs_skip() {
        testing_logger::setup();
        let mut project = project();
        project.remove_file(template::WORKFLOW_PATH).unwrap();
        project.try_apply_patch(template::WORKFLOW_PATH, &[]).unwrap();

        testing_logger::validate(|captured| {
            assert!(captured.iter().any(|entry| {
                entry.level == log::Level::Info
                    && entry
                        .body
                        .contains("Skipping patch for optional file .github/workflows/build.yml")
            }));
        });
    }

    #[test]
    fn test_try_apply_patch_applies_when_present() {
        let mut project = project();
        let ops = [PatchOperation::replace("/name", json!("ci"))];
        assert!(project.try_apply_patch(template::WORKFLOW_PATH, &ops).unwrap());
        assert_eq!(project.find_file(template::WORKFLOW_PATH).unwrap()["name"], json!("ci"));
    }

    #[test]
    fn test_merge_into_tsconfig() {
        let mut project = project();
        project
            .merge(
                "tsconfig.json",
                "compilerOptions",
                &json!({"lib": ["dom"], "skipLibCheck": true}),
                ArrayMerge::Append,
            )
            .unwrap();
        let options = &project.find_file("tsconfig.json").unwrap()["compilerOptions"];
        assert_eq!(options["lib"], json!(["es2020", "dom"]));
        assert_eq!(options["skipLibCheck"], json!(true));
    }

    #[test]
    fn test_synth_writes_every_file() {
        let project = project();
        let count = project.files().len();
        let mut destination = MemoryDestination::new();
        let report = project.synth(&mut destination).unwrap();
        assert_eq!(report.written.len(), count);
        assert_eq!(destination.len(), count);
    }

    #[test]
    fn test_find_file_mut() {
        let mut project = project();
        project.find_file_mut("package.json").unwrap()["private"] = json!(true);
        assert_eq!(project.find_file("package.json").unwrap()["private"], json!(true));
    }
}
