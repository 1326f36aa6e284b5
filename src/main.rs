mod config;
mod error;
mod path_util;
mod rewriter;
mod storage;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use config::Config;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(
    name = "lcov-relpath",
    about = "Rewrite absolute SF: paths in an lcov report relative to the working directory"
)]
struct Cli {
    /// lcov report to rewrite (in place unless --output is given)
    lcov_file: PathBuf,

    /// Write the rewritten report here instead of overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory paths are made relative to (default: current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// YAML settings file (default: .lcov-relpath.yaml in the base directory, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overwrite the output directly instead of writing a temp file and renaming it
    #[arg(long)]
    no_atomic: bool,

    /// Use '/' separators in rewritten paths
    #[arg(long)]
    normalize_separators: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    if let Some(log_dir) = &cli.log_dir {
        init_file_logging(log_dir, level)?;
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(level)
            .init();
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    // Resolve to absolute path
    let base_dir = match cli.base_dir {
        Some(dir) if dir.is_absolute() => dir,
        Some(dir) => path_util::normalize_lexically(&cwd.join(dir)),
        None => cwd,
    };

    let (config, config_source) = Config::discover(cli.config.as_deref(), &base_dir)?;
    if let Some(source) = &config_source {
        info!("Using config {}", source.display());
    }
    let mut options = config.rewrite_options();
    if cli.no_atomic {
        options.atomic = false;
    }
    if cli.normalize_separators {
        options.normalize_separators = true;
    }

    let output = cli.output.as_deref().unwrap_or(cli.lcov_file.as_path());
    let summary = rewriter::rewrite_file(&cli.lcov_file, &base_dir, output, &options)
        .with_context(|| format!("Failed to rewrite {}", cli.lcov_file.display()))?;

    info!("{}: {}", output.display(), summary);
    if summary.unrelatable > 0 {
        warn!(
            "{} SF path(s) have no relative form from {} and were left unchanged",
            summary.unrelatable,
            base_dir.display()
        );
    }

    println!("{} format {} Done!", base_dir.display(), cli.lcov_file.display());
    Ok(())
}

/// Initialize file-based logging to a directory.
fn init_file_logging(log_dir: &Path, level: Level) -> Result<()> {
    use chrono::Local;
    use std::sync::Mutex;

    std::fs::create_dir_all(log_dir)?;
    let now = Local::now();
    let log_filename = now.format("%Y%m%d-%H%M%S.log").to_string();
    let log_file_path = log_dir.join(&log_filename);
    let log_file = std::fs::File::create(&log_file_path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_max_level(level)
        .init();

    eprintln!("Log file: {}", log_file_path.display());
    Ok(())
}
