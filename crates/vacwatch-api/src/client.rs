// Async HTTP client for the Vacancy API.
//
// Holds the transport mechanics only: base URL handling, verb helpers and
// response decoding. Endpoint methods live in `vacancies.rs` and
// `reference.rs` as inherent impls.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Vacancy API.
///
/// The base URL already includes the API prefix, e.g.
/// `http://localhost:8090/api/v1`. Trailing slashes are stripped so that
/// endpoint paths can always be appended verbatim.
#[derive(Debug, Clone)]
pub struct VacancyClient {
    http: reqwest::Client,
    base_url: String,
}

impl VacancyClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own `reqwest::Client`.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_http(http, base_url)
    }

    /// Wrap an existing `reqwest::Client` (shared connection pool).
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// The normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `path` to the base URL and attach query parameters.
    pub(crate) fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let detail = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                detail: Some(serde_json::Value::String(s)),
            }) => Some(s),
            Ok(ErrorResponse { detail: Some(other) }) => Some(other.to_string()),
            _ if raw.trim().is_empty() => None,
            _ => Some(raw),
        };

        debug!(status = status.as_u16(), ?detail, "API returned an error");
        Error::Api {
            status: status.as_u16(),
            detail,
        }
    }
}

/// Validate the base URL and strip trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed)?;
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client =
            VacancyClient::with_http(reqwest::Client::new(), "http://localhost:8090/api/v1///")
                .expect("valid base");
        assert_eq!(client.base_url(), "http://localhost:8090/api/v1");
    }

    #[test]
    fn invalid_base_is_rejected() {
        let result = VacancyClient::with_http(reqwest::Client::new(), "not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn url_appends_path_and_params() {
        let client = VacancyClient::with_http(reqwest::Client::new(), "http://api.test/api/v1/")
            .expect("valid base");
        let url = client
            .url("/vacancies/count", &[("title", "rust dev".into())])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "http://api.test/api/v1/vacancies/count?title=rust+dev"
        );
    }
}
