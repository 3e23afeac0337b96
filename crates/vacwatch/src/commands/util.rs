//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use vacwatch_core::format_timestamp;

use crate::error::CliError;

/// Spinner on stderr while a request runs. `None` when quiet or piped.
pub fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub fn finish(spinner: Option<ProgressBar>) {
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
}

/// Parse an optional salary flag. An empty value clears the field.
pub fn parse_amount(field: &str, raw: Option<&str>) -> Result<Option<Option<u64>>, CliError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Some(None));
    }
    raw.parse()
        .map(|v| Some(Some(v)))
        .map_err(|_| CliError::Validation {
            field: field.into(),
            reason: format!("'{raw}' is not a whole number"),
        })
}

pub fn format_time(ts: Option<&DateTime<Utc>>) -> String {
    ts.map_or_else(|| "never".into(), format_timestamp)
}

pub fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_owned(),
        _ => "-".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_flag_states() {
        assert!(matches!(parse_amount("min", None), Ok(None)));
        assert!(matches!(parse_amount("min", Some(" ")), Ok(Some(None))));
        assert!(matches!(parse_amount("min", Some("1200")), Ok(Some(Some(1200)))));
        assert!(matches!(
            parse_amount("min", Some("12k")),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn dash_for_blank() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some("Berlin")), "Berlin");
    }
}
