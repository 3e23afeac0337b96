//! Storage port for settings and poll state.
//!
//! The poller, the CLI and the TUI never touch files directly: they talk
//! to a [`SettingsStore`], and any surface that wants live updates holds a
//! `watch::Receiver<Record>` from [`SettingsStore::subscribe`].

mod file;
mod memory;

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::watch;

use crate::model::{PollSettings, PollState, Record};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What [`SettingsStore::refresh`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Unchanged,
    /// Only poll state differs (another poller wrote it).
    StateChanged,
    /// Settings were edited by another process.
    SettingsChanged,
}

/// Key-value storage shared by the poller and every settings surface.
///
/// Writes replace one half of the [`Record`] and leave the other half
/// alone, so a settings save racing a poll never loses either side.
/// Concurrent writers to the same half resolve last-write-wins.
pub trait SettingsStore: Send + Sync {
    /// Current record.
    fn load(&self) -> Record;

    /// Overwrite settings in place.
    fn save_settings(&self, settings: &PollSettings) -> Result<(), StorageError>;

    /// Edit poll state in place.
    fn modify_state(&self, edit: &mut dyn FnMut(&mut PollState)) -> Result<(), StorageError>;

    /// Observe every successful write.
    fn subscribe(&self) -> watch::Receiver<Record>;

    /// Persist `defaults` if nothing was stored before. Returns `true`
    /// when this call performed the install.
    fn install_defaults(&self, defaults: &PollSettings) -> Result<bool, StorageError>;

    /// Pick up writes made outside this process.
    fn refresh(&self) -> Result<RefreshOutcome, StorageError> {
        Ok(RefreshOutcome::Unchanged)
    }
}

/// Compare two records and classify the difference.
pub(crate) fn classify(current: &Record, incoming: &Record) -> RefreshOutcome {
    if current.settings != incoming.settings {
        RefreshOutcome::SettingsChanged
    } else if current.state != incoming.state {
        RefreshOutcome::StateChanged
    } else {
        RefreshOutcome::Unchanged
    }
}
