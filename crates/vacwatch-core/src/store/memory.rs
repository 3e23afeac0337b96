// In-process store. Used by tests and by ephemeral runs that should not
// touch the state file.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use super::{SettingsStore, StorageError};
use crate::model::{PollSettings, PollState, Record};

/// Store backed by a `watch` channel only.
pub struct MemoryStore {
    record: watch::Sender<Record>,
    installed: AtomicBool,
}

impl MemoryStore {
    /// Empty store; defaults are applied by the first `install_defaults`.
    pub fn new() -> Self {
        let (record, _) = watch::channel(Record::default());
        Self {
            record,
            installed: AtomicBool::new(false),
        }
    }

    /// Store that already holds `record` (counts as installed).
    pub fn with_record(record: Record) -> Self {
        let (record, _) = watch::channel(record);
        Self {
            record,
            installed: AtomicBool::new(true),
        }
    }

    /// Replace the whole record, publishing it to subscribers.
    pub(crate) fn replace(&self, record: Record) {
        self.installed.store(true, Ordering::SeqCst);
        self.record.send_replace(record);
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Record {
        self.record.borrow().clone()
    }

    fn save_settings(&self, settings: &PollSettings) -> Result<(), StorageError> {
        self.installed.store(true, Ordering::SeqCst);
        self.record.send_modify(|r| r.settings = settings.clone());
        Ok(())
    }

    fn modify_state(&self, edit: &mut dyn FnMut(&mut PollState)) -> Result<(), StorageError> {
        self.record.send_modify(|r| edit(&mut r.state));
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Record> {
        self.record.subscribe()
    }

    fn install_defaults(&self, defaults: &PollSettings) -> Result<bool, StorageError> {
        if self.installed.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        self.record.send_modify(|r| r.settings = defaults.clone());
        Ok(true)
    }
}
