//! # Validate Command Implementation
//!
//! Validates a `.projsynth.yaml` file without writing anything:
//!
//! - **Configuration Validation**: parses the file and checks names, paths,
//!   glob patterns and structural paths.
//! - **Dry Synthesis**: builds the project in memory so that operations which
//!   only fail against real documents (a patch on a removed file, a `test`
//!   that does not match) are reported too.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use projsynth::config;
use projsynth::dependencies::DependencyKind;
use projsynth::output::{emoji, OutputConfig};
use projsynth::phases::orchestrator;

/// Validate a .projsynth.yaml configuration file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the .projsynth.yaml configuration file to validate.
    #[arg(short, long, value_name = "FILE", env = "PROJSYNTH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Execute the `validate` command.
///
/// `color_flag` is the value of the global `--color` flag.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config_path = super::config_path(args.config);
    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        config_path.display()
    );

    if !config_path.exists() {
        return super::load_config(&config_path).map(|_| ());
    }

    let config = match config::from_file(&config_path) {
        Ok(config) => {
            println!(
                "{} Configuration file parsed successfully",
                emoji(&out, "✅", "[OK]")
            );
            config
        }
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {}", e));
        }
    };

    println!("\n{} Configuration Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Project: {}", config.project.name);
    for kind in DependencyKind::ALL {
        let declared = config.dependencies.get(kind).len() + config.overrides.get(kind).len();
        if declared > 0 {
            println!("   {}: {} declared", kind.manifest_key(), declared);
        }
    }
    println!("   Total operations: {}", config.operations.len());
    for name in ["remove", "lines", "patch", "merge"] {
        let count = config
            .operations
            .iter()
            .filter(|op| op.name() == name)
            .count();
        if count > 0 {
            println!("   {} operations: {}", name, count);
        }
    }

    println!("\n{} Building project in memory...", emoji(&out, "🔄", "[CHECK]"));
    match orchestrator::build(&config) {
        Ok(project) => {
            println!(
                "{} All operations apply cleanly ({} files)",
                emoji(&out, "✅", "[OK]"),
                project.files().len()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", emoji(&out, "❌", "[ERR]"), e);
            Err(anyhow::anyhow!("Configuration has errors that must be fixed: {}", e))
        }
    }
}
