//! # Error Handling
//!
//! This module defines the centralized error type for `f2`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the rename pipeline can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants fall into four groups:
//!   - conflicts detected before any filesystem mutation
//!     ([`Error::ConflictDetected`]), which the caller can recover from by
//!     fixing the inputs or enabling auto-fix;
//!   - informational failures that never touch the filesystem, such as
//!     [`Error::BackupNotFound`];
//!   - mutation failures ([`Error::PartialFailure`], [`Error::TotalFailure`],
//!     [`Error::BackupFailed`]) raised after renames were attempted;
//!   - wrapped library errors (I/O, JSON, regex, directory walking).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for f2 operations
#[derive(Error, Debug)]
pub enum Error {
    /// Unresolved conflicts exist and auto-fixing is disabled.
    ///
    /// Raised before any file is renamed, so the filesystem is untouched.
    #[error("{count} conflict(s) detected: resolve them before proceeding or use -F/--fix-conflicts to fix them automatically")]
    ConflictDetected { count: usize },

    /// No backup record exists for the working directory being reverted.
    #[error("Unable to find a backup file for '{}': there is nothing to undo", working_dir.display())]
    BackupNotFound { working_dir: PathBuf },

    /// Some renames failed. Successful renames were kept (and backed up when
    /// not reverting).
    #[error("Some files could not be {}. ({failed} of {total} failed)", if *revert { "reverted" } else { "renamed" })]
    PartialFailure {
        failed: usize,
        total: usize,
        revert: bool,
    },

    /// Every attempted rename failed. No backup is written.
    #[error("The {} operation failed: none of the {total} file(s) could be {}", if *revert { "undo" } else { "renaming" }, if *revert { "reverted" } else { "renamed" })]
    TotalFailure { total: usize, revert: bool },

    /// Some renames failed and the backup for the successful ones could not
    /// be written either.
    #[error("{failed} of {total} file(s) could not be renamed and the backup could not be written: {message}")]
    BackupFailed {
        failed: usize,
        total: usize,
        message: String,
    },

    /// The per-item conflict fixer did not converge.
    #[error("Could not resolve conflicts for '{}' after {attempts} attempts", target.display())]
    Unresolvable { target: PathBuf, attempts: usize },

    /// The command-line arguments do not describe a usable operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Returns `true` for the abort-before-mutation signal.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::ConflictDetected { .. })
    }

    /// Returns `true` for errors raised after renames were attempted.
    pub fn is_commit_failure(&self) -> bool {
        matches!(
            self,
            Error::PartialFailure { .. } | Error::TotalFailure { .. } | Error::BackupFailed { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
