//! # Rename Command Implementation
//!
//! Discovers candidates under the given paths, runs the find/replace chain
//! over them and hands the result to the rename pipeline. Without `-x` the
//! pipeline stops after printing the plan.

use anyhow::Result;
use log::debug;

use f2::discovery::{discover, DiscoveryOptions};
use f2::error::Error;
use f2::operation::Operation;
use f2::replace::{ReplaceOptions, Replacer};

use super::{confirm, present, RenameArgs, Session};

/// Execute a rename run.
pub fn execute(args: RenameArgs, session: &Session) -> Result<()> {
    if args.find.is_empty() && args.replace.is_empty() {
        return Err(Error::InvalidArgument {
            message: "at least one of -f/--find, -r/--replace or -u/--undo is required".to_string(),
        }
        .into());
    }

    let discovery = DiscoveryOptions {
        recursive: args.recursive,
        max_depth: args.max_depth,
        hidden: args.hidden,
        include_dir: args.include_dir,
        only_dir: args.only_dir,
    };
    let candidates = discover(&args.paths, &discovery)?;

    let replacer = Replacer::new(&ReplaceOptions {
        find: args.find.clone(),
        replace: args.replace.clone(),
        string_mode: args.string_mode,
        ignore_case: args.ignore_case,
        ignore_ext: args.ignore_ext,
        replace_limit: args.replace_limit,
        exclude: args.exclude.clone(),
    })?;
    let changes = replacer.apply(candidates);
    debug!("{} candidate(s) matched", changes.len());

    let mut operation = Operation::new(&session.working_dir, args.mode(), session.store.clone())
        .with_changes(changes);

    let result = if operation.mode().interactive {
        operation.apply_with(|op| confirm(op, &session.output))
    } else {
        operation.apply()
    };

    present(&operation, result, &session.output)
}
