//! # Candidate Discovery
//!
//! Turns the path arguments into a flat list of [`Change`]s whose target is
//! still equal to their source. Directories are listed (and walked when
//! recursing); files named directly are taken as they are.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::change::Change;
use crate::error::Result;

/// Controls which entries become rename candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryOptions {
    /// Walk into subdirectories.
    pub recursive: bool,
    /// How many directory levels below the listed ones to walk. `0` means
    /// no limit.
    pub max_depth: usize,
    /// Include hidden entries.
    pub hidden: bool,
    /// Directories are candidates too.
    pub include_dir: bool,
    /// Only directories are candidates.
    pub only_dir: bool,
}

impl DiscoveryOptions {
    fn walk_depth(&self) -> usize {
        match (self.recursive, self.max_depth) {
            (false, _) => 1,
            (true, 0) => usize::MAX,
            (true, n) => n.saturating_add(1),
        }
    }

    fn accepts(&self, is_dir: bool) -> bool {
        if is_dir {
            self.include_dir || self.only_dir
        } else {
            !self.only_dir
        }
    }
}

/// Collect candidates from `paths`, sorted by base directory then name.
pub fn discover(paths: &[PathBuf], options: &DiscoveryOptions) -> Result<Vec<Change>> {
    let mut seen_args = HashSet::new();
    let mut seen_entries = HashSet::new();
    let mut changes = Vec::new();

    for arg in paths {
        let arg = clean(arg);
        if !seen_args.insert(arg.clone()) {
            continue;
        }

        let metadata = fs::metadata(&arg)?;
        if metadata.is_dir() {
            for change in walk(&arg, options)? {
                if seen_entries.insert(change.source_path()) {
                    changes.push(change);
                }
            }
            continue;
        }

        // Files named explicitly are candidates even when hidden
        if !options.accepts(false) {
            continue;
        }
        let Some(change) = explicit_file(&arg) else {
            continue;
        };
        if seen_entries.insert(change.source_path()) {
            changes.push(change);
        }
    }

    changes.sort_by(|a, b| (&a.base_dir, &a.source).cmp(&(&b.base_dir, &b.source)));
    debug!("discovered {} candidate(s)", changes.len());
    Ok(changes)
}

fn walk(dir: &Path, options: &DiscoveryOptions) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(options.walk_depth())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| options.hidden || !is_hidden(entry));

    for entry in walker {
        let entry = entry?;
        let is_dir = entry.file_type().is_dir();
        if !options.accepts(is_dir) {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warn!("skipping {}: name is not valid UTF-8", entry.path().display());
            continue;
        };
        let base_dir = entry.path().parent().unwrap_or(dir);
        changes.push(Change::new(base_dir, name, is_dir));
    }

    Ok(changes)
}

fn explicit_file(path: &Path) -> Option<Change> {
    let name = path.file_name()?;
    let Some(name) = name.to_str() else {
        warn!("skipping {}: name is not valid UTF-8", path.display());
        return None;
    };
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some(Change::new(base_dir, name, false))
}

/// Drop `.` components and redundant separators.
fn clean(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Dot-prefixed names are hidden everywhere; on Windows the hidden
/// attribute counts too.
fn is_hidden(entry: &DirEntry) -> bool {
    let dotted = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'));
    dotted || has_hidden_attribute(entry)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_entry: &DirEntry) -> bool {
    false
}

#[cfg(windows)]
fn has_hidden_attribute(entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    entry
        .metadata()
        .is_ok_and(|metadata| metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
}
