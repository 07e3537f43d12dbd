//! dirsorter - sort files into first-character subdirectories
//!
//! Files are moved into `a`-`z`, `0-9` (or one bucket per digit) and
//! `_others` subdirectories based on the first character of their name.
//! Useful for large flat collections such as ROM sets. A recursive mode
//! cleans every directory in a tree that holds enough files.

pub mod bucket;
pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod output;
pub mod scanner;
pub mod selector;

pub use bucket::{Bucket, classify};
pub use cli::{Cli, CliError, RunSummary, SortOptions, run};
pub use config::{CompiledFilters, ConfigError, SorterConfig};
pub use file_organizer::{FileOrganizer, OrganizeError};
pub use scanner::DirectoryScanner;
pub use selector::{CleanupTarget, RecursiveSelector};
