use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use vacwatch_api::{CountQuery, PollingSettingsPush};

use super::de::lenient_opt_u64;
use crate::error::CoreError;

/// Shortest allowed timer period.
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Used when the stored interval is zero.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Upper bound the server accepts for `limit`.
pub const MAX_LIMIT: u32 = 200;

/// What to poll and how often.
///
/// Created with defaults on first install, overwritten in place by the
/// settings surfaces, read fresh by the poller on every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollSettings {
    pub api_base: String,
    pub title: String,
    pub location: String,
    #[serde(deserialize_with = "lenient_opt_u64")]
    pub min_salary: Option<u64>,
    #[serde(deserialize_with = "lenient_opt_u64")]
    pub max_salary: Option<u64>,
    pub limit: u32,
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8090/api/v1".into(),
            title: "python".into(),
            location: String::new(),
            min_salary: None,
            max_salary: None,
            limit: 20,
            interval_seconds: DEFAULT_INTERVAL_SECS,
            enabled: true,
        }
    }
}

impl PollSettings {
    /// Timer period with the floor applied.
    pub fn effective_interval(&self) -> Duration {
        let secs = match self.interval_seconds {
            0 => DEFAULT_INTERVAL_SECS,
            n => n.max(MIN_INTERVAL_SECS),
        };
        Duration::from_secs(secs)
    }

    /// Filters for `GET /vacancies/count`. Blank fields are dropped later
    /// by the query builder.
    pub fn count_query(&self) -> CountQuery {
        CountQuery {
            title: self.title.clone(),
            location: self.location.clone(),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            limit: (self.limit > 0).then_some(self.limit),
        }
    }

    /// Body for `POST /vacancies/polling-settings`.
    pub fn push_payload(&self, options: &PushOptions) -> PollingSettingsPush {
        PollingSettingsPush {
            enabled: self.enabled,
            title: non_blank(&self.title),
            location: non_blank(&self.location),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            limit: self.limit.clamp(1, MAX_LIMIT),
            area: options.area,
            only_with_salary: options.only_with_salary,
        }
    }

    /// Reject values the poller or the server could never use.
    pub fn validate(&self) -> Result<(), CoreError> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err(CoreError::validation("API base URL cannot be empty"));
        }
        let url = Url::parse(base)
            .map_err(|e| CoreError::validation(format!("invalid API base URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::validation("API base URL must be http or https"));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(CoreError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        if let (Some(min), Some(max)) = (self.min_salary, self.max_salary) {
            if min > max {
                return Err(CoreError::validation(
                    "minimum salary cannot exceed maximum salary",
                ));
            }
        }
        Ok(())
    }

    /// Trim free-text fields the way a form submit does.
    pub fn normalized(mut self) -> Self {
        self.api_base = self.api_base.trim().to_owned();
        self.title = self.title.trim().to_owned();
        self.location = self.location.trim().to_owned();
        self
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Extra fields sent with the polling-settings push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushOptions {
    pub enabled: bool,
    pub area: u32,
    pub only_with_salary: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            area: 1,
            only_with_salary: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interval_floor_is_enforced() {
        let mut settings = PollSettings {
            interval_seconds: 3,
            ..PollSettings::default()
        };
        assert_eq!(settings.effective_interval(), Duration::from_secs(10));

        settings.interval_seconds = 0;
        assert_eq!(settings.effective_interval(), Duration::from_secs(60));

        settings.interval_seconds = 90;
        assert_eq!(settings.effective_interval(), Duration::from_secs(90));
    }

    #[test]
    fn validation() {
        assert!(PollSettings::default().validate().is_ok());

        let bad_url = PollSettings {
            api_base: "localhost".into(),
            ..PollSettings::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_limit = PollSettings {
            limit: 0,
            ..PollSettings::default()
        };
        assert!(bad_limit.validate().is_err());

        let inverted = PollSettings {
            min_salary: Some(200),
            max_salary: Some(100),
            ..PollSettings::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn push_payload_drops_blank_text() {
        let settings = PollSettings {
            title: "  ".into(),
            location: "Berlin".into(),
            ..PollSettings::default()
        };
        let push = settings.push_payload(&PushOptions::default());
        assert_eq!(push.title, None);
        assert_eq!(push.location.as_deref(), Some("Berlin"));
        assert_eq!(push.area, 1);
        assert!(!push.only_with_salary);
    }

    #[test]
    fn deserializes_string_salaries() {
        let settings: PollSettings = serde_json::from_str(
            r#"{"apiBase":"http://api.test","minSalary":"","maxSalary":"250000","limit":5}"#,
        )
        .expect("valid settings");
        assert_eq!(settings.min_salary, None);
        assert_eq!(settings.max_salary, Some(250_000));
        assert_eq!(settings.title, "python");
        assert_eq!(settings.interval_seconds, 60);
    }
}
