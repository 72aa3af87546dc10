//! # Conflict Detection and Resolution
//!
//! A batch of renames can go wrong in ways no single rename shows on its own.
//! This module reasons about the candidate [`Change`](crate::change::Change)
//! list as a set:
//!
//! - [`detection`] runs the ordered per-item checks (empty name, trailing
//!   periods, length, forbidden characters, existing path) to a fixed point,
//!   then looks for several candidates landing on the same path.
//! - [`target`] generates collision-free `name (N).ext` targets when
//!   conflicts are fixed automatically.
//!
//! Every detection pass produces a fresh [`ConflictMap`]; conflicts are never
//! persisted.

pub mod detection;
pub mod target;

pub use detection::{detect_conflicts, DetectOptions, Detection};
pub use target::new_target;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The kinds of conflict a rename batch can contain.
///
/// The declaration order is the order conflicts are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictType {
    EmptyFilename,
    TrailingPeriod,
    FileExists,
    OverwritingNewPath,
    InvalidCharacters,
    MaxFilenameLengthExceeded,
}

/// One detected collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// The contested resulting path.
    pub target: PathBuf,
    /// Extra detail, e.g. the offending characters or the limit exceeded.
    pub cause: String,
    /// Source paths involved, in batch order.
    pub sources: Vec<PathBuf>,
}

impl Conflict {
    pub fn new(source: PathBuf, target: PathBuf) -> Self {
        Self {
            target,
            cause: String::new(),
            sources: vec![source],
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = cause.into();
        self
    }
}

/// Conflicts grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictMap(BTreeMap<ConflictType, Vec<Conflict>>);

impl ConflictMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict under `kind`.
    pub fn push(&mut self, kind: ConflictType, conflict: Conflict) {
        self.0.entry(kind).or_default().push(conflict);
    }

    /// Conflicts of one kind, in detection order.
    pub fn get(&self, kind: ConflictType) -> &[Conflict] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over the groups in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (ConflictType, &[Conflict])> {
        self.0.iter().map(|(kind, list)| (*kind, list.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of conflicts across all kinds.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
