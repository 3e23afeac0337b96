// ── Core error types ──
//
// User-facing errors from vacwatch-core. Transport-level failures from
// `vacwatch-api` are translated by the `From` impl below; the resulting
// `Display` text is what the poller stores as `lastError`.

use thiserror::Error;

use crate::store::StorageError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the vacancy API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the vacancy API timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid vacancy id: {raw}")]
    InvalidVacancyId { raw: String },

    #[error("Unexpected response from the vacancy API: {message}")]
    MalformedResponse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api { message: String, status: Option<u16> },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the failure was caused by user input rather than the API.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidVacancyId { .. } | Self::ValidationFailed { .. }
        )
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vacwatch_api::Error> for CoreError {
    fn from(err: vacwatch_api::Error) -> Self {
        match err {
            vacwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization()),
                        reason: "connection refused or host unreachable".into(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            vacwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid API base URL: {e}"),
            },
            vacwatch_api::Error::Client(message) => CoreError::Internal(message),
            vacwatch_api::Error::Api {
                status: 404,
                detail,
            } => CoreError::NotFound {
                resource: detail.unwrap_or_else(|| "requested resource".into()),
            },
            vacwatch_api::Error::Api { status, .. } => CoreError::Api {
                message: err.to_string(),
                status: Some(status),
            },
            vacwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_keeps_short_message() {
        let err: CoreError = vacwatch_api::Error::Api {
            status: 502,
            detail: None,
        }
        .into();
        assert_eq!(err.to_string(), "API error: 502");
    }

    #[test]
    fn api_detail_is_appended() {
        let err: CoreError = vacwatch_api::Error::Api {
            status: 500,
            detail: Some("boom".into()),
        }
        .into();
        assert_eq!(err.to_string(), "API error: 500 (boom)");
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err: CoreError = vacwatch_api::Error::Api {
            status: 404,
            detail: Some("Vacancy not found".into()),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
