//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Project Synthesis - Generate project configuration files from a declarative description
#[derive(Parser, Debug)]
#[command(name = "projsynth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize the project described by .projsynth.yaml and write its files
    #[command(alias = "apply")]
    Synth(commands::synth::SynthArgs),

    /// Check whether the files on disk match what synthesis would produce
    Check(commands::check::CheckArgs),

    /// List the files synthesis would produce
    Ls(commands::ls::LsArgs),

    /// Validate a .projsynth.yaml configuration file
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Synth(args) => commands::synth::execute(args, &self.color),
            Commands::Check(args) => commands::check::execute(args, &self.color),
            Commands::Ls(args) => commands::ls::execute(args),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialization only happens in tests; ignore it.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
