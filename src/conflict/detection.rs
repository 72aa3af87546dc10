//! Conflict detection pass.
//!
//! ## Process
//!
//! 1.  **Per-item checks**: each change runs through the ordered checks
//!     (empty name, trailing periods, length, forbidden characters, existing
//!     path). With auto-fix enabled a check that rewrites the target sends
//!     the same change back through the whole list, until every check passes.
//!     A hard cap on attempts turns non-convergence into
//!     [`Error::Unresolvable`].
//!
//! 2.  **Cross-item check**: targets claimed by several changes are reported
//!     as `overwritingNewPath`. With auto-fix the earliest change keeps its
//!     target and every later one is renumbered.
//!
//! Checks observe the list as it is being rewritten, so a fix applied to an
//! earlier change is visible to later ones.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use super::target::new_target;
use super::{Conflict, ConflictMap, ConflictType};
use crate::change::{Change, RenameStatus};
use crate::error::{Error, Result};
use crate::path;
use crate::platform::Platform;

/// Upper bound on check/fix rounds for a single change.
///
/// Every fix strictly shrinks the target or moves it to a fresh number, so
/// real inputs settle in a handful of rounds.
pub const MAX_FIX_ATTEMPTS: usize = 32;

/// Policy flags for a detection pass.
#[derive(Debug, Clone, Copy)]
pub struct DetectOptions {
    pub fix_conflicts: bool,
    pub allow_overwrites: bool,
    pub platform: Platform,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            fix_conflicts: false,
            allow_overwrites: false,
            platform: Platform::current(),
        }
    }
}

/// Result of a detection pass.
#[derive(Debug, Clone)]
pub struct Detection {
    pub changes: Vec<Change>,
    pub conflicts: ConflictMap,
}

/// Destination paths claimed so far, remembered in first-claim order.
#[derive(Debug, Default)]
struct Claims {
    by_target: HashMap<PathBuf, Vec<usize>>,
    order: Vec<PathBuf>,
}

impl Claims {
    fn claim(&mut self, target: PathBuf, index: usize) {
        let entry = self.by_target.entry(target.clone()).or_default();
        if entry.is_empty() {
            self.order.push(target);
        }
        entry.push(index);
    }

    /// Mark a path as taken without attributing it to a change.
    fn reserve(&mut self, target: PathBuf) {
        self.by_target.entry(target).or_default();
    }

    fn contains(&self, target: &Path) -> bool {
        self.by_target.contains_key(target)
    }

    /// Targets claimed by more than one change, earliest claim first.
    fn collisions(&self) -> Vec<(PathBuf, Vec<usize>)> {
        self.order
            .iter()
            .filter_map(|target| {
                let indices = self.by_target.get(target)?;
                (indices.len() > 1).then(|| (target.clone(), indices.clone()))
            })
            .collect()
    }
}

/// What to do with a change after one round of checks.
enum Verdict {
    /// The change settled; claim its target.
    Settled,
    /// The change was reverted to "leave it alone"; nothing to claim.
    Skipped,
    /// A fix rewrote the target; run the checks again.
    Recheck,
}

/// Detect (and optionally fix) every conflict in `changes`.
///
/// This is a pure transformation of the list apart from `stat` calls against
/// the filesystem: sources are never touched, only targets, statuses and
/// overwrite flags.
pub fn detect_conflicts(mut changes: Vec<Change>, options: &DetectOptions) -> Result<Detection> {
    let mut conflicts = ConflictMap::new();
    let mut claims = Claims::default();

    for change in changes.iter_mut() {
        change.reset();
    }

    for index in 0..changes.len() {
        let (earlier, rest) = changes.split_at_mut(index);
        let (earlier, change) = (&*earlier, &mut rest[0]);

        let settled = settle(change, MAX_FIX_ATTEMPTS, |change| {
            check(change, earlier, options, &mut conflicts, &claims)
        })?;
        if settled {
            claims.claim(change.target_path(), index);
        }
    }

    check_overwriting_new_paths(&mut changes, options, &mut conflicts, &mut claims)?;

    Ok(Detection { changes, conflicts })
}

/// Run `check` against one change until it stops rewriting the target.
///
/// Returns whether the change settled on a target it should claim.
fn settle<F>(change: &mut Change, limit: usize, mut check: F) -> Result<bool>
where
    F: FnMut(&mut Change) -> Result<Verdict>,
{
    for _ in 0..limit {
        match check(change)? {
            Verdict::Settled => return Ok(true),
            Verdict::Skipped => return Ok(false),
            Verdict::Recheck => debug!("rechecking '{}' after fix", change.target),
        }
    }

    Err(Error::Unresolvable {
        target: change.target_path(),
        attempts: limit,
    })
}

/// Run the ordered per-item checks once.
fn check(
    change: &mut Change,
    earlier: &[Change],
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
    claims: &Claims,
) -> Result<Verdict> {
    if check_empty_filename(change, options, conflicts) {
        return Ok(Verdict::Skipped);
    }

    let fixed = check_trailing_period(change, options, conflicts)
        || check_length(change, options, conflicts)
        || check_forbidden_characters(change, options, conflicts)
        || check_path_exists(change, earlier, options, conflicts, claims)?;

    Ok(if fixed {
        Verdict::Recheck
    } else {
        Verdict::Settled
    })
}

// Each check below records its conflict and returns `true` only when it
// also rewrote the target, which short-circuits the remaining checks.

/// Step 1: the replacement produced no name at all.
///
/// Returns `true` when the change must not be checked any further.
fn check_empty_filename(
    change: &mut Change,
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
) -> bool {
    if !change.target.is_empty() && change.target != "." {
        return false;
    }

    conflicts.push(
        ConflictType::EmptyFilename,
        Conflict::new(change.source_path(), change.target_path()),
    );
    change.status = RenameStatus::EmptyFilename;

    if options.fix_conflicts {
        change.target = change.source.clone();
        change.status = RenameStatus::Unchanged;
    }
    true
}

/// Step 2: a segment of the target ends in a period.
fn check_trailing_period(
    change: &mut Change,
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
) -> bool {
    let platform = options.platform;
    if !platform.has_trailing_period(&change.target) {
        return false;
    }

    conflicts.push(
        ConflictType::TrailingPeriod,
        Conflict::new(change.source_path(), change.target_path()),
    );
    change.status = RenameStatus::TrailingPeriod;

    if !options.fix_conflicts {
        return false;
    }
    change.target = platform.strip_trailing_periods(&change.target);
    change.status = RenameStatus::Ok;
    true
}

/// Step 3: the file name is longer than the platform allows.
fn check_length(change: &mut Change, options: &DetectOptions, conflicts: &mut ConflictMap) -> bool {
    let platform = options.platform;
    let name = path::file_name(&change.target, platform);
    let Some(cause) = platform.length_violation(name) else {
        return false;
    };

    conflicts.push(
        ConflictType::MaxFilenameLengthExceeded,
        Conflict::new(change.source_path(), change.target_path()).with_cause(cause),
    );
    change.status = RenameStatus::LengthExceeded;

    if !options.fix_conflicts {
        return false;
    }
    let truncated = platform.truncate_name(name);
    change.target = path::with_file_name(&change.target, &truncated, platform);
    change.status = RenameStatus::Ok;
    true
}

/// Step 4: the target contains characters the platform rejects.
fn check_forbidden_characters(
    change: &mut Change,
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
) -> bool {
    let platform = options.platform;
    let found = platform.forbidden_chars(&change.target);
    if found.is_empty() {
        return false;
    }

    let cause = found
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(",");
    conflicts.push(
        ConflictType::InvalidCharacters,
        Conflict::new(change.source_path(), change.target_path()).with_cause(cause),
    );
    change.status = RenameStatus::InvalidCharacters;

    if !options.fix_conflicts {
        return false;
    }
    change.target = platform.strip_forbidden(&change.target);
    change.status = RenameStatus::Ok;
    true
}

/// Step 5: something already lives at the target path.
fn check_path_exists(
    change: &mut Change,
    earlier: &[Change],
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
    claims: &Claims,
) -> Result<bool> {
    let source_path = change.source_path();
    let target_path = change.target_path();

    if !path::exists(&target_path) {
        return Ok(false);
    }

    // Covers unchanged names and case-only renames on case-insensitive
    // filesystems
    if path::eq_ignore_case(&source_path, &target_path) {
        change.status = RenameStatus::Unchanged;
        return Ok(false);
    }

    if options.allow_overwrites {
        change.will_overwrite = true;
        change.status = RenameStatus::Overwriting;
        return Ok(false);
    }

    // An earlier change moves the occupant away before this one runs
    let vacated = earlier.iter().any(|other| {
        other.source_path() == target_path
            && !path::eq_ignore_case(&other.source_path(), &other.target_path())
    });
    if vacated {
        return Ok(false);
    }

    conflicts.push(
        ConflictType::FileExists,
        Conflict::new(source_path, target_path),
    );
    change.status = RenameStatus::PathExists;

    if !options.fix_conflicts {
        return Ok(false);
    }
    change.target = new_target(change, options.platform, |p| claims.contains(p))?;
    change.status = RenameStatus::Ok;
    Ok(true)
}

/// Step 6: several changes end up at the same path.
fn check_overwriting_new_paths(
    changes: &mut [Change],
    options: &DetectOptions,
    conflicts: &mut ConflictMap,
    claims: &mut Claims,
) -> Result<()> {
    for (target_path, indices) in claims.collisions() {
        let sources = indices
            .iter()
            .map(|&index| changes[index].source_path())
            .collect();
        conflicts.push(
            ConflictType::OverwritingNewPath,
            Conflict {
                target: target_path,
                cause: String::new(),
                sources,
            },
        );

        if !options.fix_conflicts {
            for &index in &indices {
                changes[index].status = RenameStatus::OverwritingNewPath;
            }
            continue;
        }

        // The earliest change is canonical; later ones are renumbered and
        // then rechecked like any other fixed target
        for &index in &indices[1..] {
            let (earlier, rest) = changes.split_at_mut(index);
            let (earlier, change) = (&*earlier, &mut rest[0]);

            let target = new_target(change, options.platform, |p| claims.contains(p))?;
            debug!("renumbered '{}' to '{}'", change.target, target);
            change.target = target;
            change.will_overwrite = false;
            change.status = RenameStatus::Ok;

            let claimed = &*claims;
            let settled = settle(change, MAX_FIX_ATTEMPTS, |change| {
                check(change, earlier, options, conflicts, claimed)
            })?;
            if settled {
                claims.reserve(change.target_path());
            }
        }
    }

    Ok(())
}
