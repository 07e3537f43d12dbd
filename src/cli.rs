//! Command-line interface and run orchestration.
//!
//! [`Cli`] is the clap definition. [`SortOptions::resolve`] merges it with
//! the configuration file, and [`run`] executes a resolved run: pick the
//! directories, sort each one, report the totals.

use crate::config::{CompiledFilters, ConfigError, SorterConfig};
use crate::file_organizer::{FileOrganizer, OrganizeError};
use crate::output::OutputFormatter;
use crate::scanner::{DirReport, DirectoryScanner};
use crate::selector::RecursiveSelector;
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use indicatif::ProgressBar;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that switches every run into dry-run mode.
pub const DEBUG_ENV_VAR: &str = "DIRDEBUG";

/// Sort files into a-z, 0-9 and _others subdirectories by first character.
#[derive(Debug, Parser)]
#[command(name = "dirsorter", version, about, long_about = None)]
pub struct Cli {
    /// Directory to sort (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Walk the directory tree and clean every large enough directory
    #[arg(short, long)]
    pub recursive: bool,

    /// Give each digit its own bucket instead of one "0-9" bucket
    #[arg(short = 'd', long = "no-squash-digits")]
    pub no_squash_digits: bool,

    /// Minimum number of direct files for a directory to be cleaned in recursive mode
    #[arg(
        short = 'n',
        long = "min-files",
        value_name = "N",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub min_files: Option<usize>,

    /// Only print what would happen (also enabled by DIRDEBUG)
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Organize(#[from] OrganizeError),

    #[error("Minimum file count must be at least 1, got {0}")]
    InvalidThreshold(usize),
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct SortOptions {
    pub root: PathBuf,
    pub recursive: bool,
    pub squash_digits: bool,
    pub min_files: usize,
    pub dry_run: bool,
    pub skip_bucket_dirs: bool,
    pub filters: CompiledFilters,
}

impl SortOptions {
    /// Default options for sorting `root` in flat mode.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let settings = SorterConfig::default().sort;
        Self {
            root: root.into(),
            recursive: false,
            squash_digits: settings.squash_digits,
            min_files: settings.min_files,
            dry_run: false,
            skip_bucket_dirs: settings.skip_bucket_dirs,
            filters: CompiledFilters::default(),
        }
    }

    /// Merges command-line flags over the configuration file.
    ///
    /// `debug_env` is the raw value of [`DEBUG_ENV_VAR`] and `cwd` the
    /// directory used when none is given.
    pub fn resolve(
        cli: &Cli,
        config: &SorterConfig,
        debug_env: Option<&str>,
        cwd: &Path,
    ) -> Result<Self, CliError> {
        let min_files = cli.min_files.unwrap_or(config.sort.min_files);
        if min_files == 0 {
            return Err(CliError::InvalidThreshold(min_files));
        }

        Ok(Self {
            root: cli
                .directory
                .clone()
                .unwrap_or_else(|| cwd.to_path_buf()),
            recursive: cli.recursive,
            squash_digits: config.sort.squash_digits && !cli.no_squash_digits,
            min_files,
            dry_run: cli.dry_run || is_truthy(debug_env),
            skip_bucket_dirs: config.sort.skip_bucket_dirs,
            filters: config.filters.compile()?,
        })
    }
}

/// Interprets an environment variable value as a boolean switch.
///
/// Unset, empty, `0`, `false`, `no` and `off` are false; anything else is true.
pub fn is_truthy(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => false,
        Some(v) => !matches!(
            v.to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
    }
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<DirReport>,
}

impl RunSummary {
    /// Total files moved across every cleaned directory.
    pub fn files_moved(&self) -> usize {
        self.reports.iter().map(DirReport::moved).sum()
    }

    /// Number of individual moves that failed.
    pub fn failure_count(&self) -> usize {
        self.reports.iter().map(|r| r.failures.len()).sum()
    }

    pub fn cleaned_dirs(&self) -> impl Iterator<Item = &Path> {
        self.reports.iter().map(|r| r.dir.as_path())
    }

    /// Files moved per bucket name.
    pub fn bucket_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for op in self.reports.iter().flat_map(|r| &r.operations) {
            *counts.entry(op.bucket.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Runs a sort with already-resolved options.
///
/// In flat mode only `options.root` is cleaned. In recursive mode every
/// directory picked by the [`RecursiveSelector`] is cleaned in the order it
/// was selected.
///
/// # Examples
///
/// ```no_run
/// use dirsorter::cli::{SortOptions, run};
///
/// let mut options = SortOptions::new("/roms/snes");
/// options.dry_run = true;
/// let summary = run(&options)?;
/// println!("{} files would move", summary.files_moved());
/// # Ok::<(), dirsorter::cli::CliError>(())
/// ```
pub fn run(options: &SortOptions) -> Result<RunSummary, CliError> {
    if !options.root.is_dir() {
        return Err(OrganizeError::InvalidRoot {
            path: options.root.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        }
        .into());
    }

    let organizer = FileOrganizer::new(options.dry_run);
    let scanner = DirectoryScanner::new(organizer, options.squash_digits, options.filters.clone());

    let dirs: Vec<PathBuf> = if options.recursive {
        RecursiveSelector::new(&scanner, options.min_files, options.skip_bucket_dirs)
            .select(&options.root)?
            .into_iter()
            .map(|target| target.path)
            .collect()
    } else {
        vec![options.root.clone()]
    };
    tracing::info!(
        root = %options.root.display(),
        recursive = options.recursive,
        dry_run = options.dry_run,
        targets = dirs.len(),
        "starting sort"
    );

    let progress = if options.dry_run {
        ProgressBar::hidden()
    } else {
        let mut total = 0;
        for dir in &dirs {
            total += scanner.count_files(dir)?;
        }
        OutputFormatter::create_progress_bar(total as u64)
    };

    let mut summary = RunSummary::default();
    for dir in &dirs {
        summary.reports.push(scanner.cleanup_dir(dir, &progress)?);
    }
    progress.finish_and_clear();

    Ok(summary)
}

/// Prints the end-of-run report.
pub fn print_summary(options: &SortOptions, summary: &RunSummary) {
    for report in &summary.reports {
        for failure in &report.failures {
            OutputFormatter::error(&failure.error.to_string());
        }
    }

    OutputFormatter::summary_table(&summary.bucket_counts(), summary.files_moved());
    OutputFormatter::files_moved(summary.files_moved());

    if options.recursive {
        OutputFormatter::cleaned_directories(summary.cleaned_dirs());
    }

    if summary.failure_count() > 0 {
        OutputFormatter::warning(&format!(
            "{} file(s) could not be moved. Please review errors above.",
            summary.failure_count()
        ));
    } else if options.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    }
}
