//! # Rename Candidates
//!
//! A [`Change`] is one candidate rename: a `source` name and a proposed
//! `target`, both relative to `base_dir`. The conflict engine only ever
//! rewrites `target`, `status` and `will_overwrite`; `source` is left alone
//! and `original_source` never changes once the candidate is created.
//!
//! The serialized form is the one stored in backup records:
//!
//! ```json
//! { "base_dir": ".", "source": "a.txt", "target": "b.txt",
//!   "is_dir": false, "will_overwrite": false }
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resolution status of a single [`Change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenameStatus {
    #[default]
    Ok,
    Unchanged,
    Overwriting,
    EmptyFilename,
    TrailingPeriod,
    PathExists,
    OverwritingNewPath,
    InvalidCharacters,
    LengthExceeded,
}

impl RenameStatus {
    /// Whether this status describes a problem rather than a plan.
    pub fn is_conflict(self) -> bool {
        !matches!(
            self,
            RenameStatus::Ok | RenameStatus::Unchanged | RenameStatus::Overwriting
        )
    }
}

impl fmt::Display for RenameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RenameStatus::Ok => "ok",
            RenameStatus::Unchanged => "unchanged",
            RenameStatus::Overwriting => "overwriting",
            RenameStatus::EmptyFilename => "empty filename",
            RenameStatus::TrailingPeriod => "trailing periods are prohibited",
            RenameStatus::PathExists => "path already exists",
            RenameStatus::OverwritingNewPath => "overwriting newly renamed path",
            RenameStatus::InvalidCharacters => "invalid characters present",
            RenameStatus::LengthExceeded => "max file name length exceeded",
        };
        f.write_str(text)
    }
}

/// One candidate rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredChange")]
pub struct Change {
    /// Directory the rename is scoped to.
    pub base_dir: PathBuf,
    /// Current name, relative to `base_dir`.
    pub source: String,
    /// Proposed name, relative to `base_dir`. May contain separators.
    pub target: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Committing this change replaces an existing entry.
    #[serde(default)]
    pub will_overwrite: bool,
    /// Filesystem error recorded by a failed commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub status: RenameStatus,
    #[serde(skip)]
    original_source: String,
}

impl Change {
    /// Create a candidate whose target starts out equal to its source.
    pub fn new(base_dir: impl Into<PathBuf>, source: impl Into<String>, is_dir: bool) -> Self {
        let source = source.into();
        Self {
            base_dir: base_dir.into(),
            target: source.clone(),
            original_source: source.clone(),
            source,
            is_dir,
            will_overwrite: false,
            error: None,
            status: RenameStatus::Ok,
        }
    }

    /// Builder-style setter for the proposed target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// The source name as it was before any replacement stage touched it.
    ///
    /// Records loaded from a backup have no history, so this is their
    /// recorded source.
    pub fn original_source(&self) -> &str {
        &self.original_source
    }

    /// Full path of the entry before renaming.
    pub fn source_path(&self) -> PathBuf {
        self.base_dir.join(&self.source)
    }

    /// Full path of the entry after renaming.
    pub fn target_path(&self) -> PathBuf {
        self.base_dir.join(&self.target)
    }

    /// Whether committing this change would leave the entry where it is.
    pub fn is_unchanged(&self) -> bool {
        self.source_path() == self.target_path()
    }

    /// Whether the target places the entry into a (possibly new) directory.
    pub fn target_has_directory(&self, is_separator: impl Fn(char) -> bool) -> bool {
        self.target.contains(is_separator)
    }

    /// The inverse rename, used to undo a committed change.
    pub fn reversed(&self) -> Self {
        Self {
            base_dir: self.base_dir.clone(),
            source: self.target.clone(),
            target: self.source.clone(),
            original_source: self.target.clone(),
            is_dir: self.is_dir,
            will_overwrite: false,
            error: None,
            status: RenameStatus::Ok,
        }
    }

    /// Reset everything a previous detection or commit pass derived.
    pub(crate) fn reset(&mut self) {
        self.status = RenameStatus::Ok;
        self.will_overwrite = false;
        self.error = None;
    }
}

/// On-disk shape of a [`Change`].
#[derive(Deserialize)]
struct StoredChange {
    base_dir: PathBuf,
    source: String,
    target: String,
    is_dir: bool,
    #[serde(default)]
    will_overwrite: bool,
    #[serde(default)]
    error: Option<String>,
}

impl From<StoredChange> for Change {
    fn from(stored: StoredChange) -> Self {
        Self {
            base_dir: stored.base_dir,
            original_source: stored.source.clone(),
            source: stored.source,
            target: stored.target,
            is_dir: stored.is_dir,
            will_overwrite: stored.will_overwrite,
            error: stored.error,
            status: RenameStatus::Ok,
        }
    }
}
