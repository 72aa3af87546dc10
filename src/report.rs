//! # Reporting
//!
//! Renders an [`Operation`] for people (tables) and for programs (JSON).
//! Nothing here writes to the terminal; callers decide where text goes.

use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use crate::change::{Change, RenameStatus};
use crate::conflict::{ConflictMap, ConflictType};
use crate::error::Result;
use crate::operation::Operation;
use crate::output::OutputConfig;
use crate::path::display_error;

/// Shown after a dry run.
pub const DRY_RUN_HINT: &str = "Commit the above changes with the -x/--exec flag";

const HEADER: [&str; 3] = ["ORIGINAL", "RENAMED", "STATUS"];

fn new_table(config: &OutputConfig) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADER.to_vec());
    if config.use_color {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }
    table
}

fn path_cell(path: &Path) -> Cell {
    Cell::new(path.display())
}

/// The planned renames with their resolution status.
pub fn plan_table(changes: &[Change], config: &OutputConfig) -> Table {
    let mut table = new_table(config);
    for change in changes {
        let color = if change.status == RenameStatus::Ok {
            Color::Green
        } else {
            Color::Yellow
        };
        table.add_row(vec![
            path_cell(&change.source_path()),
            path_cell(&change.target_path()),
            Cell::new(change.status).fg(color),
        ]);
    }
    table
}

fn conflict_status(kind: ConflictType, cause: &str) -> String {
    let status = match kind {
        ConflictType::EmptyFilename => RenameStatus::EmptyFilename,
        ConflictType::TrailingPeriod => RenameStatus::TrailingPeriod,
        ConflictType::FileExists => RenameStatus::PathExists,
        ConflictType::OverwritingNewPath => RenameStatus::OverwritingNewPath,
        ConflictType::InvalidCharacters => RenameStatus::InvalidCharacters,
        ConflictType::MaxFilenameLengthExceeded => RenameStatus::LengthExceeded,
    };
    if cause.is_empty() {
        status.to_string()
    } else {
        format!("{}: ({})", status, cause)
    }
}

/// One row per conflicting source, grouped by conflict type in report order.
pub fn conflicts_table(conflicts: &ConflictMap, config: &OutputConfig) -> Table {
    let mut table = new_table(config);
    for (kind, list) in conflicts.iter() {
        for conflict in list {
            let target = if kind == ConflictType::EmptyFilename {
                Cell::new("")
            } else {
                path_cell(&conflict.target)
            };
            for source in &conflict.sources {
                table.add_row(vec![
                    path_cell(source),
                    target.clone(),
                    Cell::new(conflict_status(kind, &conflict.cause)).fg(Color::Red),
                ]);
            }
        }
    }
    table
}

/// Outcome of a commit that had failures: successes first, then failures
/// with the reason reported by the filesystem.
pub fn results_table(changes: &[Change], errors: &[usize], config: &OutputConfig) -> Table {
    let mut table = new_table(config);
    for change in changes.iter().filter(|change| change.error.is_none()) {
        table.add_row(vec![
            path_cell(&change.source_path()),
            path_cell(&change.target_path()),
            Cell::new("success").fg(Color::Green),
        ]);
    }
    for change in errors.iter().filter_map(|&index| changes.get(index)) {
        let reason = change.error.as_deref().map(display_error).unwrap_or_default();
        table.add_row(vec![
            path_cell(&change.source_path()),
            path_cell(&change.target_path()),
            Cell::new(reason).fg(Color::Red),
        ]);
    }
    table
}

/// Machine-readable summary of an operation.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    #[serde(skip_serializing_if = "ConflictMap::is_empty")]
    pub conflicts: ConflictMap,
    pub working_dir: PathBuf,
    pub date: String,
    pub changes: Vec<Change>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<usize>,
    pub dry_run: bool,
}

impl JsonOutput {
    pub fn from_operation(operation: &Operation) -> Self {
        Self {
            conflicts: operation.conflicts().clone(),
            working_dir: operation.working_dir().to_path_buf(),
            date: operation.date().to_rfc3339_opts(SecondsFormat::Secs, true),
            changes: operation.changes().to_vec(),
            errors: operation.errors().to_vec(),
            dry_run: !operation.mode().exec,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
