//! # Backup Records
//!
//! After a successful (or partially successful) rename batch, the committed
//! changes are written to a JSON record so the batch can be undone later.
//! There is one record per working directory, stored at
//! `<data dir>/f2/backups/<sanitized working dir>.json`; a newer batch in the
//! same directory replaces the older record.
//!
//! ```json
//! {
//!     "working_dir": "/home/user/pics",
//!     "date": "2024-01-01T10:00:00Z",
//!     "operations": [
//!         { "base_dir": ".", "source": "a.jpg", "target": "b.jpg",
//!           "is_dir": false, "will_overwrite": false }
//!     ]
//! }
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::change::Change;
use crate::defaults::{default_data_dir, APP_DIR, BACKUPS_DIR};
use crate::error::Result;
use crate::path::sanitize_key;
use crate::platform::Platform;

/// Persisted snapshot of a committed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub working_dir: PathBuf,
    pub date: DateTime<Utc>,
    pub operations: Vec<Change>,
}

impl BackupRecord {
    pub fn new(working_dir: impl Into<PathBuf>, operations: Vec<Change>) -> Self {
        Self {
            working_dir: working_dir.into(),
            date: Utc::now(),
            operations,
        }
    }
}

/// Location of backup records on disk.
#[derive(Debug, Clone)]
pub struct BackupStore {
    data_dir: PathBuf,
    platform: Platform,
}

impl BackupStore {
    /// A store rooted at `data_dir` (records live in `data_dir/f2/backups`).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            platform: Platform::current(),
        }
    }

    /// Directory holding every record.
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join(APP_DIR).join(BACKUPS_DIR)
    }

    /// Where the record for `working_dir` lives, whether or not it exists.
    pub fn path_for(&self, working_dir: &Path) -> PathBuf {
        let key = sanitize_key(working_dir, self.platform);
        self.backups_dir().join(format!("{}.json", key))
    }

    /// The existing record for `working_dir`, if any.
    pub fn locate(&self, working_dir: &Path) -> Option<PathBuf> {
        let path = self.path_for(working_dir);
        path.is_file().then_some(path)
    }

    /// Write `record`, replacing any previous record for the same directory.
    ///
    /// The buffered writer is flushed and the file synced before returning,
    /// so a returned path always points at a complete record.
    pub fn write(&self, record: &BackupRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.working_dir);
        fs::create_dir_all(self.backups_dir())?;

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        debug!("wrote backup for {} to {}", record.working_dir.display(), path.display());
        Ok(path)
    }

    /// Read the record at `path`.
    pub fn load(&self, path: &Path) -> Result<BackupRecord> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Delete the record at `path`.
    pub fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)?;
        debug!("removed backup {}", path.display());
        Ok(())
    }
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(working_dir: &Path) -> BackupRecord {
        BackupRecord::new(
            working_dir,
            vec![Change::new(working_dir, "a.txt", false).with_target("b.txt")],
        )
    }

    #[test]
    fn test_path_for_uses_sanitized_working_dir() {
        let store = BackupStore::new("/data");
        let path = store.path_for(Path::new("/home/user/pics"));
        if cfg!(unix) {
            assert_eq!(
                path,
                PathBuf::from("/data/f2/backups/_home_user_pics.json")
            );
        }
    }

    #[test]
    fn test_write_then_load() {
        let data_dir = TempDir::new().unwrap();
        let store = BackupStore::new(data_dir.path());
        let record = sample_record(Path::new("/work/dir"));

        let path = store.write(&record).unwrap();
        assert!(path.starts_with(store.backups_dir()));
        assert_eq!(store.locate(Path::new("/work/dir")), Some(path.clone()));

        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded.working_dir, record.working_dir);
        assert_eq!(loaded.date, record.date);
        assert_eq!(loaded.operations, record.operations);
    }

    #[test]
    fn test_record_json_shape() {
        let data_dir = TempDir::new().unwrap();
        let store = BackupStore::new(data_dir.path());
        let path = store.write(&sample_record(Path::new("/work/dir"))).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["working_dir"], "/work/dir");
        assert!(json["date"].as_str().unwrap().contains('T'));
        assert_eq!(json["operations"][0]["source"], "a.txt");
        assert_eq!(json["operations"][0]["target"], "b.txt");
        assert_eq!(json["operations"][0]["is_dir"], false);
        assert_eq!(json["operations"][0]["will_overwrite"], false);
    }

    #[test]
    fn test_newer_record_replaces_older() {
        let data_dir = TempDir::new().unwrap();
        let store = BackupStore::new(data_dir.path());
        let working_dir = Path::new("/work/dir");

        store.write(&sample_record(working_dir)).unwrap();
        let newer = BackupRecord::new(
            working_dir,
            vec![Change::new(working_dir, "x.txt", false).with_target("y.txt")],
        );
        let path = store.write(&newer).unwrap();

        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded.operations.len(), 1);
        assert_eq!(loaded.operations[0].source, "x.txt");
        assert_eq!(fs::read_dir(store.backups_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_locate_missing_and_remove() {
        let data_dir = TempDir::new().unwrap();
        let store = BackupStore::new(data_dir.path());
        let working_dir = Path::new("/work/dir");

        assert_eq!(store.locate(working_dir), None);

        let path = store.write(&sample_record(working_dir)).unwrap();
        store.remove(&path).unwrap();
        assert_eq!(store.locate(working_dir), None);
        assert!(store.remove(&path).is_err());
    }

    #[test]
    fn test_load_rejects_malformed_record() {
        let data_dir = TempDir::new().unwrap();
        let store = BackupStore::new(data_dir.path());
        let path = data_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = store.load(&path).unwrap_err();
        assert!(err.to_string().contains("JSON error"));
    }
}
