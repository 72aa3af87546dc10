//! # Rename Operation
//!
//! An [`Operation`] owns one batch of [`Change`]s and drives it through the
//! apply pipeline:
//!
//! ```text
//! apply ── no changes ───────────────────────────────► NoMatches
//!   │
//!   ├─ detect conflicts ── unresolved, no auto-fix ──► Err(ConflictDetected)
//!   │
//!   ├─ dry run ──────────────────────────────────────► DryRun
//!   │
//!   ├─ confirmation declined ────────────────────────► Cancelled
//!   │
//!   └─ commit ── rename all ── every rename failed ──► Err(TotalFailure)
//!                   │
//!                   ├─ some failed ── write backup ──► Err(PartialFailure)
//!                   │
//!                   └─ none failed ── write backup ──► Committed
//! ```
//!
//! Renames run sequentially in list order. A failed rename is recorded on its
//! change and the batch carries on; nothing is retried or rolled back.
//!
//! [`Operation::undo`] loads the backup record for the working directory,
//! inverts it, and runs it through the same pipeline. The record is deleted
//! once an executed undo succeeds.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::backup::{BackupRecord, BackupStore};
use crate::change::Change;
use crate::conflict::{detect_conflicts, ConflictMap, DetectOptions};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::sort::{sort_changes, SortKey};

/// Policy flags for one invocation.
///
/// `quiet`, `verbose`, `json` and `interactive` only affect presentation and
/// are carried here so that callers can hand a single value around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Commit to the filesystem instead of printing a plan.
    pub exec: bool,
    /// Rewrite conflicting targets instead of aborting.
    pub fix_conflicts: bool,
    /// Allow renames onto existing paths.
    pub allow_overwrites: bool,
    /// Directories are part of the batch.
    pub include_dir: bool,
    /// The batch replays a backup record.
    pub revert: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub json: bool,
    /// Ask for confirmation before committing.
    pub interactive: bool,
    /// Order matches before detection. Executed undos ignore it.
    pub sort: Option<SortKey>,
    /// Reverse the `sort` order.
    pub sort_reverse: bool,
}

/// How a successful pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// There was nothing to rename.
    NoMatches,
    /// The plan was computed but not committed.
    DryRun,
    /// The caller declined to commit the plan.
    Cancelled,
    /// Every rename succeeded. `backup` is `None` for reverts.
    Committed { backup: Option<PathBuf> },
    /// An executed undo succeeded.
    Reverted { backup: PathBuf, backup_removed: bool },
}

/// A batch renaming operation.
#[derive(Debug)]
pub struct Operation {
    working_dir: PathBuf,
    date: DateTime<Utc>,
    mode: Mode,
    platform: Platform,
    store: BackupStore,
    changes: Vec<Change>,
    conflicts: ConflictMap,
    errors: Vec<usize>,
}

impl Operation {
    pub fn new(working_dir: impl Into<PathBuf>, mode: Mode, store: BackupStore) -> Self {
        Self {
            working_dir: working_dir.into(),
            date: Utc::now(),
            mode,
            platform: Platform::current(),
            store,
            changes: Vec::new(),
            conflicts: ConflictMap::new(),
            errors: Vec::new(),
        }
    }

    /// Use a specific naming policy instead of the host's.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the candidate changes.
    pub fn with_changes(mut self, changes: Vec<Change>) -> Self {
        self.changes = changes;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Conflicts found by the last [`apply`](Self::apply).
    pub fn conflicts(&self) -> &ConflictMap {
        &self.conflicts
    }

    /// Indices of changes whose rename failed during the last commit.
    pub fn errors(&self) -> &[usize] {
        &self.errors
    }

    /// Run the pipeline without asking for confirmation.
    pub fn apply(&mut self) -> Result<Outcome> {
        self.apply_with(|_| Ok(true))
    }

    /// Run the pipeline, calling `confirm` with the resolved plan right
    /// before committing it.
    pub fn apply_with<F>(&mut self, confirm: F) -> Result<Outcome>
    where
        F: FnOnce(&Operation) -> Result<bool>,
    {
        self.conflicts = ConflictMap::new();
        self.errors.clear();

        if self.changes.is_empty() {
            return Ok(Outcome::NoMatches);
        }

        // Ordering happens before detection so that the "an earlier change
        // vacates this path" rule sees the order renames are committed in.
        // An executed undo must replay the record exactly.
        if let Some(key) = self.mode.sort {
            if !(self.mode.revert && self.mode.exec) {
                sort_changes(&mut self.changes, key, self.mode.sort_reverse)?;
            }
        }
        if self.mode.include_dir && !self.mode.revert {
            sort_for_commit(&mut self.changes);
        }

        let options = DetectOptions {
            fix_conflicts: self.mode.fix_conflicts,
            allow_overwrites: self.mode.allow_overwrites,
            platform: self.platform,
        };
        let detection = detect_conflicts(std::mem::take(&mut self.changes), &options)?;
        self.changes = detection.changes;
        self.conflicts = detection.conflicts;

        if !self.conflicts.is_empty() && !self.mode.fix_conflicts {
            return Err(Error::ConflictDetected {
                count: self.conflicts.len(),
            });
        }

        if !self.mode.exec {
            return Ok(Outcome::DryRun);
        }

        if !confirm(&*self)? {
            info!("commit declined, nothing was renamed");
            return Ok(Outcome::Cancelled);
        }

        self.commit()
    }

    /// Apply the changes to the filesystem and record the result.
    fn commit(&mut self) -> Result<Outcome> {
        self.rename_all();

        if !self.errors.is_empty() {
            return self.handle_errors();
        }

        if self.mode.revert {
            return Ok(Outcome::Committed { backup: None });
        }

        let backup = self.store.write(&self.record())?;
        Ok(Outcome::Committed {
            backup: Some(backup),
        })
    }

    /// Rename every changed entry in order, creating target directories as
    /// needed. Failures are recorded on the change and in `errors`.
    fn rename_all(&mut self) {
        let platform = self.platform;
        let mut errors = Vec::new();

        for (index, change) in self.changes.iter_mut().enumerate() {
            change.error = None;

            let source = change.source_path();
            let target = change.target_path();
            if source == target {
                continue;
            }

            if change.target_has_directory(|c| platform.is_separator(c)) {
                if let Some(parent) = target.parent() {
                    if let Err(e) = create_dirs(parent) {
                        warn!("failed to create {}: {}", parent.display(), e);
                        change.error = Some(format!("mkdir {}: {}", parent.display(), e));
                        errors.push(index);
                        continue;
                    }
                }
            }

            debug!("renaming {} to {}", source.display(), target.display());
            if let Err(e) = fs::rename(&source, &target) {
                warn!(
                    "failed to rename {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                );
                change.error = Some(format!(
                    "rename {} {}: {}",
                    source.display(),
                    target.display(),
                    e
                ));
                errors.push(index);
            }
        }

        self.errors = errors;
    }

    /// Turn recorded rename failures into the matching error, writing a
    /// backup for the successful part of a forward batch.
    fn handle_errors(&mut self) -> Result<Outcome> {
        let failed = self.errors.len();
        let total = self.changes.iter().filter(|c| !c.is_unchanged()).count();
        let revert = self.mode.revert;

        if failed >= total {
            return Err(Error::TotalFailure { total, revert });
        }

        if !revert {
            if let Err(e) = self.store.write(&self.record()) {
                warn!("could not write backup: {}", e);
                return Err(Error::BackupFailed {
                    failed,
                    total,
                    message: e.to_string(),
                });
            }
        }

        Err(Error::PartialFailure {
            failed,
            total,
            revert,
        })
    }

    fn record(&self) -> BackupRecord {
        BackupRecord::new(self.working_dir.clone(), self.changes.clone())
    }

    /// Revert the last batch committed in the working directory.
    ///
    /// Changes whose rename failed originally are left out, and the rest are
    /// replayed in reverse commit order with source and target swapped.
    pub fn undo(&mut self) -> Result<Outcome> {
        self.undo_with(|_| Ok(true))
    }

    /// Like [`undo`](Self::undo), with a confirmation hook.
    pub fn undo_with<F>(&mut self, confirm: F) -> Result<Outcome>
    where
        F: FnOnce(&Operation) -> Result<bool>,
    {
        self.mode.revert = true;

        let path = self
            .store
            .locate(&self.working_dir)
            .ok_or_else(|| Error::BackupNotFound {
                working_dir: self.working_dir.clone(),
            })?;
        let record = self.store.load(&path)?;

        self.changes = record
            .operations
            .iter()
            .rev()
            .filter(|change| change.error.is_none())
            .map(Change::reversed)
            .collect();

        let outcome = self.apply_with(confirm)?;
        if !matches!(outcome, Outcome::Committed { .. }) {
            return Ok(outcome);
        }

        let backup_removed = match self.store.remove(&path) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "unable to remove backup file {} after a successful undo: {}",
                    path.display(),
                    e
                );
                false
            }
        };

        Ok(Outcome::Reverted {
            backup: path,
            backup_removed,
        })
    }
}

/// Files before directories, deeper directories before their parents, so
/// nothing is renamed out from under a change that still needs it.
fn sort_for_commit(changes: &mut [Change]) {
    changes.sort_by_key(|change| (change.is_dir, Reverse(change.base_dir.components().count())));
}

#[cfg(unix)]
fn create_dirs(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o750).create(path)
}

#[cfg(not(unix))]
fn create_dirs(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}
