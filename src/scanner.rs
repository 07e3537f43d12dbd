//! Flat-mode directory scanning.
//!
//! Sorts the immediate regular files of one directory into bucket
//! subdirectories of that same directory. Subdirectories and symlinks are
//! left alone and never descended into.

use crate::bucket::classify;
use crate::config::CompiledFilters;
use crate::file_organizer::{FileOrganizer, Operation, OrganizeError, OrganizeResult};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    /// True only for regular files. Symlinks are never regular files here,
    /// even when they point at one.
    pub is_file: bool,
}

/// A move that failed. The run continues past it.
#[derive(Debug)]
pub struct FailedMove {
    pub path: PathBuf,
    pub error: OrganizeError,
}

/// What happened to one directory.
#[derive(Debug)]
pub struct DirReport {
    pub dir: PathBuf,
    pub operations: Vec<Operation>,
    pub failures: Vec<FailedMove>,
}

impl DirReport {
    /// Number of files moved (or, in dry-run mode, that would have moved).
    pub fn moved(&self) -> usize {
        self.operations.len()
    }
}

/// Lists the immediate entries of `dir`.
///
/// Entries that vanish or cannot be inspected mid-listing are skipped with
/// a warning.
pub fn list_entries(dir: &Path) -> OrganizeResult<Vec<FileEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| OrganizeError::ReadDirFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_file = match entry.file_type() {
            Ok(file_type) => file_type.is_file(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "cannot stat entry");
                continue;
            }
        };
        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_file,
        });
    }

    Ok(entries)
}

/// Classifies and moves the regular files of single directories.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    organizer: FileOrganizer,
    squash_digits: bool,
    filters: CompiledFilters,
}

impl DirectoryScanner {
    pub fn new(organizer: FileOrganizer, squash_digits: bool, filters: CompiledFilters) -> Self {
        Self {
            organizer,
            squash_digits,
            filters,
        }
    }

    /// Regular files in `dir` that pass the filters, sorted by name.
    pub fn sortable_files(&self, dir: &Path) -> OrganizeResult<Vec<FileEntry>> {
        let mut files: Vec<FileEntry> = list_entries(dir)?
            .into_iter()
            .filter(|entry| entry.is_file && self.filters.should_include(&entry.path))
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Number of files [`cleanup_dir`](Self::cleanup_dir) would consider in `dir`.
    pub fn count_files(&self, dir: &Path) -> OrganizeResult<usize> {
        Ok(self.sortable_files(dir)?.len())
    }

    /// Moves every sortable file of `dir` into its bucket under `dir`.
    ///
    /// A failed move is recorded in the report and does not stop the
    /// remaining files. Moves already made are kept.
    pub fn cleanup_dir(&self, dir: &Path, progress: &ProgressBar) -> OrganizeResult<DirReport> {
        let files = self.sortable_files(dir)?;
        tracing::info!(dir = %dir.display(), files = files.len(), "cleaning directory");

        let mut report = DirReport {
            dir: dir.to_path_buf(),
            operations: Vec::with_capacity(files.len()),
            failures: Vec::new(),
        };

        for file in files {
            let bucket = classify(&file.name, self.squash_digits);
            progress.set_message(file.name.clone());

            match self
                .organizer
                .move_to_bucket(dir, &file.path, &bucket.dir_name())
            {
                Ok(operation) => report.operations.push(operation),
                Err(error) => {
                    tracing::warn!(path = %file.path.display(), error = %error, "move failed");
                    report.failures.push(FailedMove {
                        path: file.path,
                        error,
                    });
                }
            }
            progress.inc(1);
        }

        Ok(report)
    }
}
