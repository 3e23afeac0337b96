// Vacancy endpoints: count (used by the poller), listing, detail, and the
// polling-settings push.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::VacancyClient;
use crate::error::Error;
use crate::query::{CountQuery, VacancyQuery};
use crate::types::{CountResponse, PollingSettingsPush, Vacancy, VacancySummary};

impl VacancyClient {
    /// Exact URL the poller requests for `query`.
    pub fn count_url(&self, query: &CountQuery) -> Result<Url, Error> {
        self.url("/vacancies/count", &query.to_params())
    }

    /// Count vacancies matching the filters.
    ///
    /// `GET /vacancies/count` → `{ "count": N }`. A body that is valid JSON
    /// but lacks a usable `count` decodes as 0.
    pub async fn count(&self, query: &CountQuery) -> Result<u64, Error> {
        let url = self.count_url(query)?;
        let payload: Value = self.get(url).await?;
        let count = CountResponse::from_value(&payload).count;
        debug!(count, "vacancy count fetched");
        Ok(count)
    }

    /// List vacancies page by page.
    ///
    /// `GET /vacancies?{filters}&offset=&limit=`
    pub async fn list_vacancies(&self, query: &VacancyQuery) -> Result<Vec<VacancySummary>, Error> {
        let url = self.url("/vacancies", &query.to_params())?;
        self.get(url).await
    }

    /// Fetch one vacancy with its embedded references and skills.
    ///
    /// `GET /vacancies/{id}`
    pub async fn get_vacancy(&self, id: i64) -> Result<Vacancy, Error> {
        let url = self.url(&format!("/vacancies/{id}"), &[])?;
        self.get(url).await
    }

    /// Push the poller's filter criteria to the server.
    ///
    /// `POST /vacancies/polling-settings`. The response body is ignored.
    pub async fn push_polling_settings(&self, settings: &PollingSettingsPush) -> Result<(), Error> {
        let url = self.url("/vacancies/polling-settings", &[])?;
        debug!(enabled = settings.enabled, limit = settings.limit, "pushing polling settings");
        self.post_no_response(url, settings).await
    }
}
