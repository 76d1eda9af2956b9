//! Integration tests for the synthesis pipeline through the public API.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use projsynth::config;
use projsynth::dependencies::{dependencies_from_manifest, DependencyKind, DependencySpec};
use projsynth::error::Error;
use projsynth::patch::PatchOperation;
use projsynth::phases::orchestrator;
use projsynth::phases::write::{self, ChangeStatus, MemoryDestination};
use projsynth::project::Project;
use projsynth::template::{ProjectOptions, WORKFLOW_PATH};

const LIBRARY: &str = r#"
project:
  name: my-lib
dependencies:
  dev: ["typescript@3.9.5"]
overrides:
  dev: ["typescript@3.9.5", "eslint@8.16.0"]
operations:
  - remove: { path: .eslintrc.json }
  - lines: { path: .npmignore, lines: ["/src", "/test"] }
  - merge:
      path: tsconfig.json
      at: compilerOptions
      value: { lib: ["dom"] }
      arrays: append
"#;

#[test]
fn test_synthesis_is_byte_identical_across_runs() {
    let config = config::parse(LIBRARY).unwrap();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let first_fs = orchestrator::execute_synth(&config, Some(first.path())).unwrap();
    orchestrator::execute_synth(&config, Some(second.path())).unwrap();

    for path in first_fs.list_files() {
        let a = fs::read(first.path().join(&path)).unwrap();
        let b = fs::read(second.path().join(&path)).unwrap();
        assert_eq!(a, b, "{} differs between runs", path.display());
    }
}

#[test]
fn test_rerun_over_existing_output_changes_nothing() {
    let config = config::parse(LIBRARY).unwrap();
    let output = TempDir::new().unwrap();

    let final_fs = orchestrator::execute_synth(&config, Some(output.path())).unwrap();
    let changes = write::diff(&final_fs, output.path()).unwrap();
    assert!(changes.iter().all(|c| c.status == ChangeStatus::Unchanged));
}

#[test]
fn test_library_scenario() {
    let config = config::parse(LIBRARY).unwrap();
    let project = orchestrator::build(&config).unwrap();

    let manifest = project.find_file("package.json").unwrap();
    let dev = dependencies_from_manifest(manifest, DependencyKind::Dev);
    assert!(dev.contains(&DependencySpec::new("typescript", "3.9.5")));
    assert!(dev.contains(&DependencySpec::new("eslint", "8.16.0")));
    // Pinning does not move a dependency already in the block
    assert_eq!(dev[0].name, "jest");

    assert!(!project.files().exists(".eslintrc.json"));
    let tsconfig = project.find_file("tsconfig.json").unwrap();
    assert_eq!(tsconfig["compilerOptions"]["lib"], json!(["es2020", "dom"]));

    let mut destination = MemoryDestination::new();
    project.synth(&mut destination).unwrap();
    assert_eq!(destination.get(".npmignore").unwrap(), b"/src\n/test\n");
}

#[test]
fn test_workflow_step_scenario() {
    let mut project = Project::new(&ProjectOptions::new("ci")).unwrap();
    project
        .apply_patch(
            WORKFLOW_PATH,
            &[
                PatchOperation::replace("/jobs/build/steps/3/run", json!("npm run compile")),
                PatchOperation::add(
                    "/jobs/build/steps/5",
                    json!({"name": "Lint", "run": "npm run eslint"}),
                ),
            ],
        )
        .unwrap();

    let workflow = project.find_file(WORKFLOW_PATH).unwrap();
    let steps = workflow["jobs"]["build"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 6);
    assert_eq!(steps[3]["run"], json!("npm run compile"));
    assert_eq!(steps[5]["name"], json!("Lint"));

    let mut destination = MemoryDestination::new();
    project.synth(&mut destination).unwrap();
    let rendered = String::from_utf8(destination.get(WORKFLOW_PATH).unwrap().to_vec()).unwrap();
    assert!(rendered.contains("run: npm run compile"));
}

#[test]
fn test_missing_step_is_an_error() {
    let options = ProjectOptions {
        typescript: false,
        ..ProjectOptions::new("plain")
    };
    let mut project = Project::new(&options).unwrap();

    // Without the build step there are only four steps
    let err = project
        .apply_patch(
            WORKFLOW_PATH,
            &[PatchOperation::replace("/jobs/build/steps/4/run", json!("x"))],
        )
        .unwrap_err();
    match err {
        Error::PathNotFound { file, path } => {
            assert_eq!(file, WORKFLOW_PATH);
            assert_eq!(path, "/jobs/build/steps/4/run");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validation_failure_leaves_output_untouched() {
    let output = TempDir::new().unwrap();
    fs::write(output.path().join("package.json"), "{}\n").unwrap();

    let config = config::parse(
        r#"
project: { name: demo }
operations:
  - lines: { path: tsconfig.json, lines: ["{}"] }
  - patch:
      path: tsconfig.json
      ops:
        - { op: add, path: /compilerOptions/strict, value: true }
"#,
    )
    .unwrap();

    let err = orchestrator::execute_synth(&config, Some(output.path())).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(
        fs::read_to_string(output.path().join("package.json")).unwrap(),
        "{}\n"
    );
    assert!(!output.path().join("tsconfig.json").exists());
}

#[test]
fn test_optional_patch_after_disabled_default() {
    let config = config::parse(
        r#"
project: { name: no-ci }
defaults: { github: false }
operations:
  - patch:
      path: .github/workflows/build.yml
      optional: true
      ops:
        - { op: replace, path: /jobs/build/steps/3/run, value: npm run compile }
"#,
    )
    .unwrap();

    let final_fs = orchestrator::execute_synth(&config, None).unwrap();
    assert!(!final_fs.exists(WORKFLOW_PATH));
}
