//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};

use f2::backup::BackupStore;
use f2::defaults::default_data_dir;
use f2::output::OutputConfig;

use crate::commands::{self, RenameArgs, Session};

/// f2 - Batch-rename files and directories
#[derive(Parser, Debug)]
#[command(name = "f2")]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    #[command(flatten)]
    args: RenameArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Directory holding f2's backup records.
    ///
    /// Defaults to the platform data directory (`~/.local/share` on Linux).
    #[arg(long, value_name = "DIR", env = "F2_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let session = Session {
            output: OutputConfig::from_env_and_flag(&self.color),
            store: BackupStore::new(self.data_dir.unwrap_or_else(default_data_dir)),
            working_dir: std::env::current_dir()?,
        };

        if self.args.undo {
            commands::undo::execute(self.args, &session)
        } else {
            commands::rename::execute(self.args, &session)
        }
    }
}

/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
