// JSON-file store.
//
// The file is the source of truth across processes; an in-memory mirror
// serves reads and fans out change notifications. Every write re-reads the
// file, edits its own half of the record, then writes a uniquely named
// sibling temp file and renames it into place.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use super::memory::MemoryStore;
use super::{RefreshOutcome, SettingsStore, StorageError, classify};
use crate::model::{PollSettings, PollState, Record};

/// Store persisted as a single JSON document.
pub struct FileStore {
    path: PathBuf,
    mirror: MemoryStore,
    write_lock: Mutex<()>,
    /// A write picked up settings edited by another process; the next
    /// refresh must still report them.
    absorbed_settings: AtomicBool,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists.
    ///
    /// A missing file is not an error: the store starts uninstalled and
    /// the first `install_defaults` creates it. A file that exists but
    /// does not parse is reported as [`StorageError::Corrupt`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let mirror = match read_record(&path)? {
            Some(record) => {
                debug!(path = %path.display(), "loaded state file");
                MemoryStore::with_record(record)
            }
            None => MemoryStore::new(),
        };
        Ok(Self {
            path,
            mirror,
            write_lock: Mutex::new(()),
            absorbed_settings: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and publish it if another process changed it.
    ///
    /// A missing file counts as unchanged. A corrupt one is an error and
    /// the mirror keeps its last good record.
    pub fn refresh_from_disk(&self) -> Result<RefreshOutcome, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let absorbed = self.absorbed_settings.swap(false, Ordering::SeqCst);
        let mut outcome = match read_record(&self.path)? {
            Some(incoming) => {
                let outcome = classify(&self.mirror.load(), &incoming);
                if outcome != RefreshOutcome::Unchanged {
                    debug!(?outcome, "state file changed on disk");
                    self.mirror.replace(incoming);
                }
                outcome
            }
            None => RefreshOutcome::Unchanged,
        };
        if absorbed {
            outcome = RefreshOutcome::SettingsChanged;
        }
        Ok(outcome)
    }

    /// Read-modify-write against the file on disk, then publish.
    ///
    /// Starting from the disk copy keeps whatever another process wrote
    /// since our last refresh.
    fn write_with(&self, edit: impl FnOnce(&mut Record)) -> Result<(), StorageError> {
        let current = self.mirror.load();
        let mut next = read_record(&self.path)?.unwrap_or_else(|| current.clone());
        if next.settings != current.settings {
            self.absorbed_settings.store(true, Ordering::SeqCst);
        }
        edit(&mut next);
        self.write(&next)?;
        self.mirror.replace(next);
        Ok(())
    }

    fn write(&self, record: &Record) -> Result<(), StorageError> {
        let json = record.to_json()?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(parent).map_err(|source| self.io_error(source))?;
        tmp.write_all(json.as_bytes())
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Record {
        self.mirror.load()
    }

    fn save_settings(&self, settings: &PollSettings) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_with(|record| record.settings = settings.clone())
    }

    fn modify_state(&self, edit: &mut dyn FnMut(&mut PollState)) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_with(|record| edit(&mut record.state))
    }

    fn subscribe(&self) -> watch::Receiver<Record> {
        self.mirror.subscribe()
    }

    fn install_defaults(&self, defaults: &PollSettings) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = read_record(&self.path)? {
            // Another handle may have installed since we opened.
            if !self.mirror.is_installed() || self.mirror.load() != existing {
                self.mirror.replace(existing);
            }
            return Ok(false);
        }
        if self.mirror.is_installed() {
            return Ok(false);
        }
        self.write_with(|record| record.settings = defaults.clone())?;
        info!(path = %self.path.display(), "installed default settings");
        Ok(true)
    }

    fn refresh(&self) -> Result<RefreshOutcome, StorageError> {
        self.refresh_from_disk()
    }
}

fn read_record(path: &Path) -> Result<Option<Record>, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Record::from_json(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path().join("nested").join("state.json")).expect("open");
        (dir, store)
    }

    #[test]
    fn install_creates_file_once() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        assert!(store.install_defaults(&PollSettings::default()).expect("install"));
        assert!(store.path().exists());
        assert!(!store.install_defaults(&PollSettings::default()).expect("install"));
    }

    #[test]
    fn reopen_sees_persisted_record() {
        let (dir, store) = temp_store();
        store
            .save_settings(&PollSettings {
                title: "kotlin".into(),
                ..PollSettings::default()
            })
            .expect("save");
        store
            .modify_state(&mut |s| s.last_count = Some(9))
            .expect("save");

        let reopened = FileStore::open(store.path()).expect("reopen");
        let record = reopened.load();
        assert_eq!(record.settings.title, "kotlin");
        assert_eq!(record.state.last_count, Some(9));
        drop(dir);
    }

    #[test]
    fn state_write_keeps_settings_saved_by_another_handle() {
        let (_dir, daemon) = temp_store();
        daemon.install_defaults(&PollSettings::default()).expect("install");

        let cli = FileStore::open(daemon.path()).expect("second handle");
        cli.save_settings(&PollSettings {
            title: "kotlin".into(),
            ..PollSettings::default()
        })
        .expect("save");

        // The daemon has not refreshed yet; its poll result must not revert the title.
        daemon
            .modify_state(&mut |s| s.last_count = Some(5))
            .expect("state write");

        let on_disk = FileStore::open(daemon.path()).expect("reopen").load();
        assert_eq!(on_disk.settings.title, "kotlin");
        assert_eq!(on_disk.state.last_count, Some(5));
        assert_eq!(daemon.load().settings.title, "kotlin");
    }

    #[test]
    fn refresh_reports_settings_picked_up_by_a_write() {
        let (_dir, daemon) = temp_store();
        daemon.install_defaults(&PollSettings::default()).expect("install");

        let cli = FileStore::open(daemon.path()).expect("second handle");
        cli.save_settings(&PollSettings {
            interval_seconds: 30,
            ..PollSettings::default()
        })
        .expect("save");
        daemon
            .modify_state(&mut |s| s.last_count = Some(2))
            .expect("state write");

        assert_eq!(
            daemon.refresh().expect("refresh"),
            RefreshOutcome::SettingsChanged
        );
        assert_eq!(daemon.refresh().expect("refresh"), RefreshOutcome::Unchanged);
    }

    #[test]
    fn settings_write_keeps_state_written_by_another_handle() {
        let (_dir, cli) = temp_store();
        cli.install_defaults(&PollSettings::default()).expect("install");

        let daemon = FileStore::open(cli.path()).expect("second handle");
        daemon
            .modify_state(&mut |s| s.last_count = Some(12))
            .expect("state write");

        cli.save_settings(&PollSettings {
            limit: 50,
            ..PollSettings::default()
        })
        .expect("save");

        let on_disk = FileStore::open(cli.path()).expect("reopen").load();
        assert_eq!(on_disk.settings.limit, 50);
        assert_eq!(on_disk.state.last_count, Some(12));
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let (_dir, store) = temp_store();
        store.install_defaults(&PollSettings::default()).expect("install");
        store
            .modify_state(&mut |s| s.last_count = Some(1))
            .expect("state write");

        let parent = store.path().parent().expect("parent");
        let names: Vec<_> = fs::read_dir(parent)
            .expect("read dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").expect("write");

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn refresh_detects_external_settings_edit() {
        let (_dir, store) = temp_store();
        store.install_defaults(&PollSettings::default()).expect("install");
        assert_eq!(store.refresh().expect("refresh"), RefreshOutcome::Unchanged);

        let other = FileStore::open(store.path()).expect("second handle");
        other
            .save_settings(&PollSettings {
                interval_seconds: 15,
                ..PollSettings::default()
            })
            .expect("save");

        let mut rx = store.subscribe();
        assert_eq!(store.refresh().expect("refresh"), RefreshOutcome::SettingsChanged);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(store.load().settings.interval_seconds, 15);
        assert_eq!(store.refresh().expect("refresh"), RefreshOutcome::Unchanged);
    }

    #[test]
    fn refresh_detects_state_only_edit() {
        let (_dir, store) = temp_store();
        store.install_defaults(&PollSettings::default()).expect("install");

        let other = FileStore::open(store.path()).expect("second handle");
        other
            .modify_state(&mut |s| s.last_error = Some("API error: 500".into()))
            .expect("save");

        assert_eq!(
            store.refresh_from_disk().expect("refresh"),
            RefreshOutcome::StateChanged
        );
    }
}
