//! User-requested ordering of a batch.
//!
//! Matches can be ordered by name, size or one of the entry's timestamps.
//! Ties keep their discovery order, in both directions, so the result is
//! deterministic for a given directory listing.

use std::cmp::Ordering;
use std::fs;
use std::time::SystemTime;

use crate::change::Change;
use crate::error::Result;

/// What to order matches by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Alphabetical by full source path.
    #[default]
    Default,
    /// File size in bytes.
    Size,
    /// Last modification time.
    Mtime,
    /// Creation time. Not every platform records it.
    Btime,
    /// Last access time.
    Atime,
    /// Last metadata change time (modification time where unavailable).
    Ctime,
}

/// Sortable value read from an entry's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Metric {
    Size(u64),
    Time(SystemTime),
    Changed(i64, i64),
}

/// Order `changes` by `key`, largest or newest first when `reverse` is set.
///
/// Metadata is read from each source entry. A source that cannot be
/// inspected aborts the sort and leaves `changes` untouched.
pub fn sort_changes(changes: &mut Vec<Change>, key: SortKey, reverse: bool) -> Result<()> {
    let direction = |ordering: Ordering| if reverse { ordering.reverse() } else { ordering };

    if key == SortKey::Default {
        changes.sort_by(|a, b| direction(a.source_path().cmp(&b.source_path())));
        return Ok(());
    }

    let metrics = changes
        .iter()
        .map(|change| metric(change, key))
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..changes.len()).collect();
    order.sort_by(|&a, &b| direction(metrics[a].cmp(&metrics[b])));

    let mut slots: Vec<Option<Change>> = changes.drain(..).map(Some).collect();
    changes.extend(order.into_iter().filter_map(|index| slots[index].take()));
    Ok(())
}

fn metric(change: &Change, key: SortKey) -> Result<Metric> {
    let metadata = fs::symlink_metadata(change.source_path())?;
    Ok(match key {
        SortKey::Default | SortKey::Size => Metric::Size(metadata.len()),
        SortKey::Mtime => Metric::Time(metadata.modified()?),
        SortKey::Btime => Metric::Time(metadata.created()?),
        SortKey::Atime => Metric::Time(metadata.accessed()?),
        SortKey::Ctime => changed(&metadata)?,
    })
}

#[cfg(unix)]
fn changed(metadata: &fs::Metadata) -> Result<Metric> {
    use std::os::unix::fs::MetadataExt;
    Ok(Metric::Changed(metadata.ctime(), metadata.ctime_nsec()))
}

#[cfg(not(unix))]
fn changed(metadata: &fs::Metadata) -> Result<Metric> {
    Ok(Metric::Time(metadata.modified()?))
}
