//! # Check Command Implementation
//!
//! Synthesizes the project in memory and compares the result with the files
//! already in the output directory. The command fails when any generated
//! file is missing or differs, which makes it usable as a CI gate after the
//! generated files have been committed.
//!
//! This command is read-only.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use projsynth::output::{emoji, OutputConfig};
use projsynth::phases::orchestrator;
use projsynth::phases::write::{self, ChangeStatus};

/// Check whether generated files are up to date
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the .projsynth.yaml configuration file.
    #[arg(short, long, value_name = "FILE", env = "PROJSYNTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the generated files (defaults to current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Execute the `check` command.
pub fn execute(args: CheckArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let config = super::load_config(&super::config_path(args.config))?;
    let output_dir = super::output_dir(args.output)?;

    let final_fs = orchestrator::execute_synth(&config, None)?;
    let changes = write::diff(&final_fs, &output_dir)?;

    let stale: Vec<_> = changes
        .iter()
        .filter(|change| change.status != ChangeStatus::Unchanged)
        .collect();

    if stale.is_empty() {
        println!(
            "{} All {} generated files are up to date",
            emoji(&out, "✅", "[OK]"),
            changes.len()
        );
        return Ok(());
    }

    for change in &stale {
        println!("{} {}", out.change_label(change.status), change.path.display());
    }
    anyhow::bail!(
        "{} of {} generated files are out of date\n\nhint: Run `projsynth synth` to regenerate them",
        stale.len(),
        changes.len()
    )
}
