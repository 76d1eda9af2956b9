//! Synth command implementation
//!
//! Runs the whole pipeline: build the base project, apply the configured
//! operations, then write every file under the output directory. With
//! `--dry-run` nothing is written and the command reports how each file
//! compares with what is already on disk.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Args;

use projsynth::output::{emoji, OutputConfig};
use projsynth::phases::{orchestrator, write};

/// Arguments for the synth command
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Path to config file
    #[arg(short, long, value_name = "PATH", env = "PROJSYNTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory (defaults to current directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// List every file written
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the synth command
pub fn execute(args: SynthArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let start_time = Instant::now();

    let config_path = super::config_path(args.config);
    let output_dir = super::output_dir(args.output)?;

    if !args.quiet {
        println!("{} Project synthesis", emoji(&out, "🔧", "[SYNTH]"));
        if args.dry_run {
            println!(
                "{} DRY RUN MODE - No changes will be made",
                emoji(&out, "🔎", "[DRY]")
            );
        }
        println!();
    }

    if !args.quiet && args.verbose {
        println!("Parsing configuration: {}", config_path.display());
    }
    let config = super::load_config(&config_path)?;

    if args.dry_run {
        let final_fs = orchestrator::execute_synth(&config, None)?;
        let changes = write::diff(&final_fs, &output_dir)?;
        if !args.quiet {
            for change in &changes {
                println!("{} {}", out.change_label(change.status), change.path.display());
            }
            println!();
            println!("{} file(s) would be written", changes.len());
        }
        return Ok(());
    }

    let final_fs = match orchestrator::execute_synth(&config, Some(output_dir.as_path())) {
        Ok(final_fs) => final_fs,
        Err(e) => {
            if !args.quiet {
                println!("{} Synthesis failed", emoji(&out, "❌", "[ERR]"));
                println!();
            }
            return Err(e.into());
        }
    };

    if !args.quiet {
        if args.verbose {
            for path in final_fs.list_files() {
                println!("   {}", path.display());
            }
        }
        println!(
            "{} Synthesized {} in {:.2}s",
            emoji(&out, "✅", "[OK]"),
            out.bold(&config.project.name),
            start_time.elapsed().as_secs_f64()
        );
        println!("   {} files written to {}", final_fs.len(), output_dir.display());
    }

    Ok(())
}
