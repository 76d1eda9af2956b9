//! # Ls Command Implementation
//!
//! Lists the files a synthesis run would produce, without writing anything.
//!
//! - **Pattern Filtering**: `--pattern` keeps only paths matching a glob
//! - **Detailed Output**: `--long` adds the file kind and rendered size
//! - **Counting**: `--count` prints only the number of files

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use projsynth::phases::orchestrator;

/// List files that synthesis would produce
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Path to the .projsynth.yaml configuration file.
    #[arg(short, long, value_name = "FILE", env = "PROJSYNTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Filter files by glob pattern (e.g., "*.json", ".github/**").
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Use long listing format showing kind and size.
    #[arg(short, long)]
    pub long: bool,

    /// Show only the total count of files.
    #[arg(long)]
    pub count: bool,
}

/// File information for listing
struct FileInfo {
    path: PathBuf,
    kind: &'static str,
    size: usize,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs) -> Result<()> {
    let config = super::load_config(&super::config_path(args.config))?;
    let final_fs = orchestrator::execute_synth(&config, None)
        .map_err(|e| anyhow::anyhow!("Failed to process configuration: {}", e))?;

    let paths = match &args.pattern {
        Some(pattern) => final_fs
            .list_files_glob(pattern)
            .map_err(|e| anyhow::anyhow!("Invalid glob pattern '{}': {}", pattern, e))?,
        None => final_fs.list_files(),
    };

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(file) = final_fs.get_file(&path) else {
            continue;
        };
        files.push(FileInfo {
            kind: file.kind(),
            size: file.render()?.len(),
            path,
        });
    }

    if args.count {
        println!("{}", files.len());
        return Ok(());
    }

    if files.is_empty() {
        println!("No files would be created.");
        return Ok(());
    }

    for file in &files {
        if args.long {
            println!(
                "{:<5} {:>8} {}",
                file.kind,
                format_size(file.size),
                file.path.display()
            );
        } else {
            println!("{}", file.path.display());
        }
    }

    let total_size: usize = files.iter().map(|f| f.size).sum();
    println!();
    println!("{} file(s), {} total", files.len(), format_size(total_size));

    Ok(())
}

/// Format file size in human-readable form
fn format_size(size: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if size >= MB {
        format!("{:.1}M", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1}K", size as f64 / KB as f64)
    } else {
        format!("{}B", size)
    }
}
