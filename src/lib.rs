//! # f2
//!
//! Batch renaming for files and directories, with conflict detection,
//! automatic conflict fixing and undo.
//!
//! ## Quick Example
//!
//! ```no_run
//! use f2::backup::BackupStore;
//! use f2::discovery::{discover, DiscoveryOptions};
//! use f2::operation::{Mode, Operation};
//! use f2::replace::{ReplaceOptions, Replacer};
//!
//! # fn main() -> f2::error::Result<()> {
//! let candidates = discover(&[".".into()], &DiscoveryOptions::default())?;
//! let replacer = Replacer::new(&ReplaceOptions {
//!     find: vec!["jpeg".into()],
//!     replace: vec!["jpg".into()],
//!     ..Default::default()
//! })?;
//!
//! let mode = Mode { exec: true, ..Mode::default() };
//! let mut operation = Operation::new(std::env::current_dir()?, mode, BackupStore::default())
//!     .with_changes(replacer.apply(candidates));
//! operation.apply()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - **Changes (`change`)**: One candidate rename: a source name, a proposed
//!   target and the directory both are relative to.
//! - **Conflicts (`conflict`)**: Reasons a batch cannot be committed as is,
//!   found (and optionally fixed) by looking at the whole batch at once.
//! - **Platform policy (`platform`)**: Which names the host filesystem
//!   rejects and how long names may be.
//! - **Operations (`operation`)**: The apply/commit/undo pipeline.
//! - **Backups (`backup`)**: Records of committed batches, used by undo.
//!
//! ## Execution Flow
//!
//! 1.  **Discovery**: List the candidate entries under the given paths.
//! 2.  **Replacement**: Keep the entries the find pattern matches and compute
//!     their targets.
//! 3.  **Detection**: Find conflicts, fixing them when asked to.
//! 4.  **Commit**: Rename in order, collect failures, write a backup.

pub mod backup;
pub mod change;
pub mod conflict;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod operation;
pub mod output;
pub mod path;
pub mod platform;
pub mod replace;
pub mod report;
pub mod sort;

#[cfg(test)]
mod path_proptest;
