use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::{iso_offset, lenient_opt_u64, value_as_u64};
use super::settings::PollSettings;

/// Result of the most recent poll, written only by the poller.
///
/// `last_count` is the baseline for the next delta. A failed poll leaves
/// it untouched so that recovery never looks like a burst of new vacancies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollState {
    #[serde(with = "iso_offset")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient_opt_u64")]
    pub last_count: Option<u64>,
    pub last_error: Option<String>,
    pub polling_status: Option<String>,
}

impl PollState {
    /// Count to diff against; zero means no baseline yet.
    pub fn baseline(&self) -> u64 {
        self.last_count.unwrap_or(0)
    }
}

/// Human-readable `pollingStatus` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Scheduled(Duration),
    Ok(Duration),
    Error(Duration),
    Disabled,
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled(every) => write!(f, "Polling: scheduled ({} sec)", every.as_secs()),
            Self::Ok(every) => write!(f, "Polling: ok ({} sec)", every.as_secs()),
            Self::Error(every) => write!(f, "Polling: error ({} sec)", every.as_secs()),
            Self::Disabled => f.write_str("Polling: disabled"),
        }
    }
}

/// Everything persisted, as one flat key-value document:
/// `apiBase, title, location, minSalary, maxSalary, limit, intervalSeconds,
/// enabled, lastChecked, lastCount, lastError, pollingStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub settings: PollSettings,
    #[serde(flatten)]
    pub state: PollState,
}

impl Record {
    /// Parse a stored document.
    ///
    /// Documents written with the superseded minutes-based interval
    /// (`intervalMinutes`) are migrated to `intervalSeconds`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Value = serde_json::from_str(raw)?;
        if let Some(map) = doc.as_object_mut() {
            if !map.contains_key("intervalSeconds") {
                if let Some(minutes) = map.get("intervalMinutes").and_then(value_as_u64) {
                    map.insert("intervalSeconds".into(), Value::from(minutes.saturating_mul(60)));
                }
            }
            map.remove("intervalMinutes");
        }
        serde_json::from_value(doc)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
