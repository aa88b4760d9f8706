//! Top-level CLI definition and dispatch.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::core::config::{CliOverrides, Config};
use crate::core::errors::Result;
use crate::engine::matcher::{ConfiguredMatcher, Matcher, NullMatcher};
use crate::engine::platform;
use crate::engine::reporter::{HumanReporter, Reporter};
use crate::engine::walker::{RunSummary, Walker, WalkerOptions};

/// pdumpfs — daily snapshot backup tool inspired by Plan 9's dumpfs.
#[derive(Debug, Parser)]
#[command(
    name = "pdumpfs",
    author,
    version,
    about = "Daily snapshot backup, hard-linking unchanged files into the prior snapshot",
    long_about = None
)]
pub struct Cli {
    /// Source directory to snapshot.
    pub src: PathBuf,
    /// Destination root under which dated snapshots are stored.
    pub dest: PathBuf,
    /// Final path segment under each date directory; defaults to the
    /// basename of `SRC`.
    pub base: Option<String>,

    /// Add a full-path regular-expression exclusion pattern (repeatable).
    #[arg(short = 'e', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Exclude regular files at or above this size; suffixes `K`/`M`/`G`/`T`/`P`
    /// (case-insensitive, powers of 1024; default multiplier 1).
    #[arg(long = "exclude-by-size", value_name = "SIZE")]
    pub exclude_by_size: Option<String>,

    /// Add a basename shell-glob exclusion pattern, regular files only
    /// (repeatable).
    #[arg(long = "exclude-by-glob", value_name = "GLOB")]
    pub exclude_by_glob: Vec<String>,

    /// Append-mode log file destination.
    #[arg(short = 'l', long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Redirect normal output to the host's null device.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Perform classification and reporting but no writes; no `latest`
    /// update, no log entry.
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Emit stack context on abort.
    #[arg(long)]
    pub backtrace: bool,

    /// Load configuration from this path instead of the default or
    /// `PDUMPFS_CONFIG`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments, resolve configuration, and run one snapshot.
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let config = Config::load(cli.config.as_deref())?.merge_cli(CliOverrides {
        exclude: cli.exclude.clone(),
        exclude_glob: cli.exclude_by_glob.clone(),
        exclude_by_size: cli.exclude_by_size.clone(),
        log_file: cli.log_file.clone(),
    });

    let matcher: Arc<dyn Matcher> = if config.exclude.is_empty()
        && config.exclude_glob.is_empty()
        && config.exclude_by_size.is_none()
    {
        Arc::new(NullMatcher)
    } else {
        Arc::new(ConfiguredMatcher::new(
            &config.exclude,
            &config.exclude_glob,
            config.exclude_by_size.as_deref(),
        )?)
    };

    let reporter: Arc<dyn Reporter> = if cli.quiet {
        Arc::new(HumanReporter::quiet())
    } else {
        Arc::new(HumanReporter::stdout())
    };

    let adapter = platform::detect()?;
    let walker = Walker::new(adapter, matcher, reporter);

    let options = WalkerOptions {
        base_name: cli.base.clone(),
        dry_run: cli.dry_run,
        log_file: config.log_file,
    };

    walker.run(&cli.src, &cli.dest, &options)
}
