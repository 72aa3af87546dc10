//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("a.txt", "a");
//!     fixture.command().args(["-f", "a", "-r", "b"]).assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A working directory plus a private data directory for backup records.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("a.txt", "hello")
///     .with_file("docs/b.txt", "world");
///
/// fixture.command().args(["-f", "a", "-r", "c", "-x"]).assert().success();
/// fixture.child("c.txt").assert(predicate::path::exists());
/// ```
pub struct TestFixture {
    work_dir: assert_fs::TempDir,
    data_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with empty directories.
    pub fn new() -> Self {
        Self {
            work_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            data_dir: assert_fs::TempDir::new().expect("Failed to create data directory"),
        }
    }

    /// Add a file with the given path and content. The content defaults to
    /// the path so renamed files can be traced back.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.work_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add several files whose content is their own path.
    pub fn with_files(self, paths: &[&str]) -> Self {
        paths
            .iter()
            .fold(self, |fixture, path| fixture.with_file(path, path))
    }

    /// Add an empty directory.
    #[allow(dead_code)]
    pub fn with_dir(self, path: &str) -> Self {
        self.work_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the working directory.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Get the path to the data directory.
    #[allow(dead_code)]
    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    /// Create a child path in the working directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.work_dir.child(path)
    }

    /// Number of backup records written so far.
    #[allow(dead_code)]
    pub fn backup_count(&self) -> usize {
        let backups = self.data_dir.path().join("f2").join("backups");
        std::fs::read_dir(backups)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// An `f2` command running in the working directory, with colors off
    /// and backups kept in the fixture's data directory.
    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("f2");
        cmd.current_dir(self.path())
            .env("F2_DATA_DIR", self.data_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
