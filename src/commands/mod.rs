//! # CLI Command Implementations
//!
//! Each subcommand of the `projsynth` command-line tool lives in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `projsynth` library.

use std::path::{Path, PathBuf};

use anyhow::Result;

use projsynth::config::{self, Config, DEFAULT_CONFIG_FILE};

pub mod check;
pub mod completions;
pub mod ls;
pub mod synth;
pub mod validate;

/// The config path given on the command line, or the default file name.
pub fn config_path(arg: Option<PathBuf>) -> PathBuf {
    arg.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load a configuration file, with hints when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(config_not_found(path));
    }
    Ok(config::from_file(path)?)
}

/// Output directory given on the command line, or the current directory.
pub fn output_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a {default} file in your project root\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set the PROJSYNTH_CONFIG environment variable",
        path = path.display(),
        default = DEFAULT_CONFIG_FILE
    )
}
