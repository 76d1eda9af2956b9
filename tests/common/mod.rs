//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::MINIMAL);
//!     fixture.command().arg("ls").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Common configuration YAML snippets for testing.
#[allow(dead_code)]
pub mod configs {
    /// Minimal valid configuration: defaults only.
    pub const MINIMAL: &str = "project:\n  name: demo\n";

    /// The library scenario: pinned toolchain versions and a lint script.
    pub const LIBRARY: &str = r#"
project:
  name: my-lib
  description: A library
dependencies:
  dev: ["typescript@3.9.5"]
overrides:
  dev: ["typescript@3.9.5", "eslint@8.16.0"]
operations:
  - patch:
      path: package.json
      ops:
        - { op: add, path: /scripts/lint, value: "eslint ." }
  - lines: { path: .npmignore, lines: ["/src", "/test"] }
"#;

    /// Retargets the CI build step.
    pub const WORKFLOW_PATCH: &str = r#"
project:
  name: ci-demo
operations:
  - patch:
      path: .github/workflows/build.yml
      ops:
        - { op: replace, path: /jobs/build/steps/3/run, value: npm run compile }
"#;

    /// Patches a file that an earlier operation removed.
    pub const PATCH_REMOVED_FILE: &str = r#"
project:
  name: broken
defaults:
  github: false
operations:
  - patch:
      path: .github/workflows/build.yml
      ops:
        - { op: replace, path: /jobs/build/steps/3/run, value: npm run compile }
"#;

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "project: [unclosed\n";
}

/// A temporary directory with an optional `.projsynth.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.projsynth.yaml` configuration file with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child(".projsynth.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".projsynth.yaml")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Colors are forced off and `PROJSYNTH_CONFIG` is cleared so the
    /// caller's environment cannot leak in.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("projsynth");
        cmd.current_dir(self.path())
            .env_remove("PROJSYNTH_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
