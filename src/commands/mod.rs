//! # CLI Command Implementations
//!
//! f2 has no subcommands: a run either renames (`rename`) or reverts the
//! last committed batch (`undo`). Both share the argument set defined here
//! and hand their finished [`Operation`] to [`present`], which prints it the
//! way the flags ask for.

pub mod rename;
pub mod undo;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use dialoguer::{theme::ColorfulTheme, Confirm};

use f2::backup::BackupStore;
use f2::error::Error;
use f2::operation::{Mode, Operation, Outcome};
use f2::output::{symbol, OutputConfig};
use f2::report::{self, JsonOutput};
use f2::sort::SortKey;

/// Settings shared by every command, resolved from global flags and the
/// environment.
#[derive(Debug)]
pub struct Session {
    pub output: OutputConfig,
    pub store: BackupStore,
    pub working_dir: PathBuf,
}

/// Arguments for a rename or undo run
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Search pattern, treated as a regular expression. Repeat to chain
    /// replacements.
    #[arg(short, long, value_name = "PATTERN")]
    pub find: Vec<String>,

    /// Replacement string for the matching find pattern. Supports `$1` and
    /// `${name}` capture references.
    #[arg(short, long, value_name = "STRING")]
    pub replace: Vec<String>,

    /// Undo the last renaming operation in the current directory
    #[arg(short, long)]
    pub undo: bool,

    /// Commit the changes to the filesystem (the default is a dry run)
    #[arg(short = 'x', long)]
    pub exec: bool,

    /// Fix conflicts automatically
    #[arg(short = 'F', long)]
    pub fix_conflicts: bool,

    /// Allow renaming onto existing paths
    #[arg(long)]
    pub allow_overwrites: bool,

    /// Include directories in the search
    #[arg(short = 'd', long)]
    pub include_dir: bool,

    /// Rename directories only
    #[arg(short = 'D', long)]
    pub only_dir: bool,

    /// Include hidden files and directories
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Search subdirectories
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Maximum depth when searching recursively (0 means no limit)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub max_depth: usize,

    /// Leave file extensions out of matching and replacement
    #[arg(short = 'e', long)]
    pub ignore_ext: bool,

    /// Match case-insensitively
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Treat find patterns as literal strings
    #[arg(short, long)]
    pub string_mode: bool,

    /// Skip entries whose name matches this regular expression
    #[arg(short = 'E', long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Number of matches to replace (0 replaces all, negative counts from
    /// the end)
    #[arg(short = 'l', long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    pub replace_limit: i64,

    /// Don't print the changes table
    #[arg(short, long)]
    pub quiet: bool,

    /// Print every rename as it happens
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Print output as JSON
    #[arg(long)]
    pub json: bool,

    /// Ask for confirmation before committing
    #[arg(short = 'I', long)]
    pub interactive: bool,

    /// Sort the matches before renaming
    #[arg(long, value_enum, value_name = "SORT", conflicts_with = "sortr")]
    pub sort: Option<SortOrder>,

    /// Same as --sort, in reverse order
    #[arg(long, value_enum, value_name = "SORT")]
    pub sortr: Option<SortOrder>,

    /// Files or directories to operate on
    #[arg(value_name = "PATHS", default_value = ".")]
    pub paths: Vec<PathBuf>,
}

impl RenameArgs {
    pub fn mode(&self) -> Mode {
        Mode {
            exec: self.exec,
            fix_conflicts: self.fix_conflicts,
            allow_overwrites: self.allow_overwrites,
            include_dir: self.include_dir || self.only_dir,
            revert: self.undo,
            quiet: self.quiet,
            verbose: self.verbose,
            json: self.json,
            interactive: self.interactive,
            sort: self.sort.or(self.sortr).map(SortKey::from),
            sort_reverse: self.sortr.is_some(),
        }
    }
}

/// Sort order options for matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Alphabetical order
    Default,
    /// File size
    Size,
    /// Last modified time
    Mtime,
    /// Creation time (Windows and macOS only)
    Btime,
    /// Last access time
    Atime,
    /// Last metadata change time
    Ctime,
}

impl From<SortOrder> for SortKey {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Default => SortKey::Default,
            SortOrder::Size => SortKey::Size,
            SortOrder::Mtime => SortKey::Mtime,
            SortOrder::Btime => SortKey::Btime,
            SortOrder::Atime => SortKey::Atime,
            SortOrder::Ctime => SortKey::Ctime,
        }
    }
}

/// Show the resolved plan and ask whether to commit it.
pub fn confirm(operation: &Operation, output: &OutputConfig) -> f2::error::Result<bool> {
    println!("{}", report::plan_table(operation.changes(), output));

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Commit the above changes?")
        .default(false)
        .interact()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// Print the result of an operation and turn library errors into the
/// binary's error type.
pub fn present(
    operation: &Operation,
    result: f2::error::Result<Outcome>,
    output: &OutputConfig,
) -> Result<()> {
    let mode = operation.mode();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) if err.is_conflict() => {
            if mode.json {
                print_json(operation)?;
            } else {
                println!("{}", report::conflicts_table(operation.conflicts(), output));
            }
            return Err(err.into());
        }
        Err(err) if err.is_commit_failure() => {
            if mode.json {
                print_json(operation)?;
            } else {
                print_verbose(operation, output);
                if !mode.quiet {
                    println!(
                        "{}",
                        report::results_table(operation.changes(), operation.errors(), output)
                    );
                }
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    if mode.json && outcome != Outcome::Cancelled {
        return print_json(operation);
    }

    match outcome {
        Outcome::NoMatches => {
            if !mode.quiet {
                let message = if mode.revert {
                    "No operations to undo"
                } else {
                    "Failed to match any files"
                };
                println!("{} {}", symbol(output, "ℹ", "[INFO]"), message);
            }
        }
        Outcome::DryRun => {
            if !mode.quiet {
                println!("{}", report::plan_table(operation.changes(), output));
                println!(
                    "{} {}",
                    output.style().black().on_blue().apply_to(" DRY RUN "),
                    report::DRY_RUN_HINT
                );
            }
        }
        Outcome::Cancelled => {
            if !mode.quiet {
                println!("Operation cancelled, nothing was renamed");
            }
        }
        Outcome::Committed { .. } => print_verbose(operation, output),
        Outcome::Reverted {
            backup,
            backup_removed,
        } => {
            print_verbose(operation, output);
            if !backup_removed {
                eprintln!(
                    "{} Unable to remove redundant backup file '{}' after successful undo operation",
                    output.style().yellow().apply_to(symbol(output, "⚠", "[WARN]")),
                    backup.display()
                );
            }
        }
    }

    Ok(())
}

fn print_json(operation: &Operation) -> Result<()> {
    println!("{}", JsonOutput::from_operation(operation).to_json()?);
    Ok(())
}

fn print_verbose(operation: &Operation, output: &OutputConfig) {
    if !operation.mode().verbose {
        return;
    }

    let style = output.style();
    for change in operation.changes().iter().filter(|c| !c.is_unchanged()) {
        let source = change.source_path();
        let target = change.target_path();
        if change.error.is_some() {
            eprintln!(
                "{} Failed to rename {} to {}",
                style.clone().red().apply_to(symbol(output, "✗", "[ERROR]")),
                source.display(),
                target.display()
            );
        } else {
            println!(
                "{} Renamed '{}' to '{}'",
                style.clone().green().apply_to(symbol(output, "✓", "[OK]")),
                style.clone().yellow().apply_to(source.display()),
                style.clone().yellow().apply_to(target.display())
            );
        }
    }
}
