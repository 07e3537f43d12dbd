//! Bucket directory creation and file moves.
//!
//! [`FileOrganizer`] is the only place that mutates the filesystem. When it
//! is built in dry-run mode every mutation is replaced by a `[DRY RUN]`
//! notice describing what would have happened. The checks that can make a
//! real move fail still run, so a dry run fails on the same files.

use crate::output::OutputFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while organizing files.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The directory to organize is missing or is not a directory.
    #[error("Invalid directory {}: {source}", .path.display())]
    InvalidRoot { path: PathBuf, source: io::Error },

    /// Listing a directory failed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },

    /// Failed to create a bucket directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Something other than a directory already occupies the bucket path.
    #[error("Cannot use {} as a bucket: a non-directory entry already exists there", .path.display())]
    BucketPathNotDirectory { path: PathBuf },

    /// The destination file already exists. Moves never overwrite.
    #[error("Refusing to overwrite existing file {}", .path.display())]
    DestinationExists { path: PathBuf },

    /// Failed to move a file to its bucket directory.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Walking a directory tree failed.
    #[error("Failed to walk directory tree under {}: {source}", .path.display())]
    WalkFailed {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A single file move, performed or simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Where the file was before the move.
    pub original_path: PathBuf,
    /// Where the file is (or would be) after the move.
    pub new_path: PathBuf,
    /// The bucket directory name the file was sorted into.
    pub bucket: String,
}

/// Creates bucket directories and moves files into them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOrganizer {
    dry_run: bool,
}

impl FileOrganizer {
    /// Creates an organizer. With `dry_run` set, nothing on disk changes.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Returns true if this organizer only reports what it would do.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Ensures `root/bucket` exists as a directory and returns its path.
    ///
    /// An existing directory is not an error. An existing file at that path
    /// is reported as [`OrganizeError::BucketPathNotDirectory`], and any other
    /// failure (missing root, permissions) as
    /// [`OrganizeError::DirectoryCreationFailed`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsorter::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let organizer = FileOrganizer::new(false);
    /// let bucket = organizer.ensure_bucket_dir(Path::new("/roms/snes"), "m")?;
    /// assert!(bucket.ends_with("m"));
    /// # Ok::<(), dirsorter::file_organizer::OrganizeError>(())
    /// ```
    pub fn ensure_bucket_dir(&self, root: &Path, bucket: &str) -> OrganizeResult<PathBuf> {
        let bucket_path = root.join(bucket);

        if self.dry_run {
            match bucket_path.symlink_metadata() {
                Ok(_) if bucket_path.is_dir() => {}
                Ok(_) => return Err(OrganizeError::BucketPathNotDirectory { path: bucket_path }),
                Err(_) => OutputFormatter::dry_run_notice(&format!(
                    "creating dir {}",
                    bucket_path.display()
                )),
            }
            return Ok(bucket_path);
        }

        match fs::create_dir(&bucket_path) {
            Ok(()) => {
                tracing::debug!(path = %bucket_path.display(), "created bucket directory");
                Ok(bucket_path)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if bucket_path.is_dir() {
                    Ok(bucket_path)
                } else {
                    Err(OrganizeError::BucketPathNotDirectory { path: bucket_path })
                }
            }
            Err(e) => Err(OrganizeError::DirectoryCreationFailed {
                path: bucket_path,
                source: e,
            }),
        }
    }

    /// Moves `source` to `destination`.
    ///
    /// Fails with [`OrganizeError::DestinationExists`] instead of replacing a
    /// file that is already there.
    pub fn move_file(&self, source: &Path, destination: &Path) -> OrganizeResult<()> {
        if destination.symlink_metadata().is_ok() {
            return Err(OrganizeError::DestinationExists {
                path: destination.to_path_buf(),
            });
        }

        if self.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "moving {} to {}",
                source.display(),
                destination.display()
            ));
            return Ok(());
        }

        fs::rename(source, destination).map_err(|e| OrganizeError::FileMoveFailure {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            from = %source.display(),
            to = %destination.display(),
            "moved file"
        );
        Ok(())
    }

    /// Moves a file into `root/bucket`, creating the bucket if needed, and
    /// records the operation.
    pub fn move_to_bucket(
        &self,
        root: &Path,
        file_path: &Path,
        bucket: &str,
    ) -> OrganizeResult<Operation> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: root.join(bucket),
                source: io::Error::new(io::ErrorKind::InvalidInput, "file has no name component"),
            })?;

        let bucket_path = self.ensure_bucket_dir(root, bucket)?;
        let destination = bucket_path.join(file_name);
        self.move_file(file_path, &destination)?;

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination,
            bucket: bucket.to_string(),
        })
    }
}
