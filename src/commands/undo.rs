//! # Undo Command Implementation
//!
//! Reverts the last batch committed in the current directory using its
//! backup record. Like a rename, an undo is a dry run unless `-x` is given,
//! and the record is only deleted once the revert has been committed.

use anyhow::Result;

use f2::operation::Operation;

use super::{confirm, present, RenameArgs, Session};

/// Execute an undo run.
pub fn execute(args: RenameArgs, session: &Session) -> Result<()> {
    let mut operation = Operation::new(&session.working_dir, args.mode(), session.store.clone());

    let result = if operation.mode().interactive {
        operation.undo_with(|op| confirm(op, &session.output))
    } else {
        operation.undo()
    };

    present(&operation, result, &session.output)
}
