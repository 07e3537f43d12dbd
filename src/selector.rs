//! Recursive selection of directories worth cleaning.
//!
//! The selector only decides. It counts the direct files of every directory
//! in the tree and returns those at or above the threshold, deepest first
//! and the root last. Nothing is moved here, so buckets
//! created by the cleanup that follows are never re-selected in the same run.

use crate::bucket::is_bucket_name;
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::scanner::DirectoryScanner;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory selected for cleanup and its direct file count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTarget {
    pub path: PathBuf,
    pub file_count: usize,
}

/// Picks directories whose direct file count meets a threshold.
#[derive(Debug)]
pub struct RecursiveSelector<'a> {
    scanner: &'a DirectoryScanner,
    min_files: usize,
    skip_bucket_dirs: bool,
}

impl<'a> RecursiveSelector<'a> {
    /// Creates a selector. With `skip_bucket_dirs`, bucket-named directories
    /// below the root are neither counted nor walked into.
    pub fn new(scanner: &'a DirectoryScanner, min_files: usize, skip_bucket_dirs: bool) -> Self {
        Self {
            scanner,
            min_files,
            skip_bucket_dirs,
        }
    }

    /// Returns cleanup targets under `root`, descendants before ancestors,
    /// with `root` itself last if it qualifies.
    ///
    /// Unreadable subdirectories are skipped with a warning. An unreadable
    /// root is an error.
    pub fn select(&self, root: &Path) -> OrganizeResult<Vec<CleanupTarget>> {
        let skip_bucket_dirs = self.skip_bucket_dirs;

        // Top-down so bucket subtrees are pruned before being read. Reversing
        // a pre-order listing puts every directory after all of its descendants.
        let walker = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                let is_bucket = entry.file_type().is_dir()
                    && is_bucket_name(&entry.file_name().to_string_lossy());
                if skip_bucket_dirs && is_bucket {
                    tracing::debug!(path = %entry.path().display(), "skipping bucket directory");
                    return false;
                }
                true
            });

        let mut dirs = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => dirs.push(entry.into_path()),
                Ok(_) => {}
                Err(e) if e.depth() == 0 => {
                    return Err(OrganizeError::WalkFailed {
                        path: root.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
            }
        }

        let mut targets = Vec::new();
        for dir in dirs.iter().rev() {
            match self.scanner.count_files(dir) {
                Ok(count) => self.consider(&mut targets, dir, count),
                Err(e) => tracing::warn!(error = %e, "skipping directory"),
            }
        }

        let root_count = self.scanner.count_files(root)?;
        self.consider(&mut targets, root, root_count);

        Ok(targets)
    }

    fn consider(&self, targets: &mut Vec<CleanupTarget>, path: &Path, file_count: usize) {
        tracing::debug!(path = %path.display(), file_count, "counted directory");
        if file_count >= self.min_files {
            targets.push(CleanupTarget {
                path: path.to_path_buf(),
                file_count,
            });
        }
    }
}
