//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use vacwatch_config::ConfigError;
use vacwatch_core::{CoreError, StorageError};

/// Process exit codes.
///
/// `0` is success and `2` (usage) is emitted by clap on parse errors.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const API: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const VALIDATION: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the vacancy API at {url}")]
    #[diagnostic(
        code(vacwatch::connection_failed),
        help(
            "Check that the API is running and the base URL is right.\n\
             Reason: {reason}\n\
             Try: vacwatch settings show"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(vacwatch::timeout),
        help("Increase the timeout with --timeout or [api] timeout_secs.")
    )]
    Timeout,

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(vacwatch::api_error))]
    Api { message: String },

    #[error("Poll failed: {message}")]
    #[diagnostic(
        code(vacwatch::poll_failed),
        help("The error was stored; `vacwatch status` shows it until the next successful poll.")
    )]
    PollFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vacwatch::not_found),
        help("Run: vacwatch {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vacwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(vacwatch::config),
        help("Check the file shown by `vacwatch config path`, or recreate it with `vacwatch config init --force`.")
    )]
    Config(#[from] ConfigError),

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(vacwatch::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── Storage / IO ─────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(vacwatch::storage),
        help("Point --state-file at a writable location, or remove a corrupt file to start over.")
    )]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::Timeout
            | Self::Api { .. }
            | Self::PollFailed { .. } => exit_code::API,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::Config(_) | Self::ConfigExists { .. } => exit_code::CONFIG,
            Self::Storage(_) | Self::Io(_) | Self::Internal(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::NotFound { resource } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: resource,
                list_command: "vacancies list".into(),
            },
            CoreError::InvalidVacancyId { raw } => CliError::Validation {
                field: "id".into(),
                reason: format!("'{raw}' is not a numeric vacancy id"),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "settings".into(),
                reason: message,
            },
            CoreError::MalformedResponse { message } => CliError::Api {
                message: format!("Unexpected response from the vacancy API: {message}"),
            },
            CoreError::Api { message, .. } => CliError::Api { message },
            CoreError::Config { message } => CliError::Validation {
                field: "api base".into(),
                reason: message,
            },
            CoreError::Storage(e) => CliError::Storage(e),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_is_a_validation_error() {
        let err = CliError::from(CoreError::InvalidVacancyId { raw: "abc".into() });
        assert_eq!(err.exit_code(), exit_code::VALIDATION);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn api_failures_share_one_code() {
        let errors = [
            CliError::from(CoreError::Timeout),
            CliError::from(CoreError::Api {
                message: "API error: 500".into(),
                status: Some(500),
            }),
            CliError::PollFailed {
                message: "API error: 502".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.exit_code(), exit_code::API);
        }
    }

    #[test]
    fn missing_resource_maps_to_not_found() {
        let err = CliError::from(CoreError::NotFound {
            resource: "Vacancy not found".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }
}
