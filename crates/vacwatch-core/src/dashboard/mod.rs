// ── Dashboard ──
//
// Read-only views over the vacancy API: overview statistics, the filtered
// listing and single-vacancy detail. Each call is independent; callers
// map results into a `ViewState` per view so one failure never blanks
// the others.

mod detail;
mod format;
mod listing;
mod view;

use serde::Serialize;
use tracing::debug;
use vacwatch_api::{
    Company, CountQuery, DashboardStats, Experience, HttpClient, Skill, TransportConfig, Vacancy,
    VacancyClient, VacancyQuery, VacancySummary, WorkFormat, WorkSchedule,
};

use crate::error::CoreError;

pub use detail::parse_vacancy_id;
pub use format::{format_count, format_salary};
pub use listing::{FilterForm, Listing, PAGE_SIZE};
pub use view::ViewState;

/// Reference collections used to populate the listing filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct References {
    pub experiences: Vec<Experience>,
    pub work_formats: Vec<WorkFormat>,
    pub work_schedules: Vec<WorkSchedule>,
    pub skills: Vec<Skill>,
}

/// Dashboard queries bound to one API base.
#[derive(Debug, Clone)]
pub struct Dashboard {
    client: VacancyClient,
}

impl Dashboard {
    pub fn new(api_base: &str, transport: &TransportConfig) -> Result<Self, CoreError> {
        Ok(Self {
            client: VacancyClient::new(api_base, transport)?,
        })
    }

    /// Share an existing connection pool.
    pub fn with_http(http: HttpClient, api_base: &str) -> Result<Self, CoreError> {
        Ok(Self {
            client: VacancyClient::with_http(http, api_base)?,
        })
    }

    pub fn api_base(&self) -> &str {
        self.client.base_url()
    }

    /// Overview statistics.
    pub async fn overview(&self) -> Result<DashboardStats, CoreError> {
        Ok(self.client.dashboard_stats().await?)
    }

    /// The current page of the listing, using its applied filters.
    pub async fn listing(&self, listing: &Listing) -> Result<Vec<VacancySummary>, CoreError> {
        debug!(page = listing.page(), "fetching vacancy page");
        self.vacancies(&listing.query()).await
    }

    /// Vacancies for an explicit query.
    pub async fn vacancies(&self, query: &VacancyQuery) -> Result<Vec<VacancySummary>, CoreError> {
        Ok(self.client.list_vacancies(query).await?)
    }

    /// One vacancy. A non-numeric `raw_id` fails without any request.
    pub async fn vacancy(&self, raw_id: &str) -> Result<Vacancy, CoreError> {
        let id = parse_vacancy_id(raw_id)?;
        Ok(self.client.get_vacancy(id).await?)
    }

    /// All filter reference lists, fetched concurrently.
    pub async fn references(&self) -> Result<References, CoreError> {
        let (experiences, work_formats, work_schedules, skills) = futures::try_join!(
            self.client.list_experiences(),
            self.client.list_work_formats(),
            self.client.list_work_schedules(),
            self.client.list_skills(),
        )?;
        Ok(References {
            experiences,
            work_formats,
            work_schedules,
            skills,
        })
    }

    pub async fn experiences(&self) -> Result<Vec<Experience>, CoreError> {
        Ok(self.client.list_experiences().await?)
    }

    pub async fn work_formats(&self) -> Result<Vec<WorkFormat>, CoreError> {
        Ok(self.client.list_work_formats().await?)
    }

    pub async fn work_schedules(&self) -> Result<Vec<WorkSchedule>, CoreError> {
        Ok(self.client.list_work_schedules().await?)
    }

    pub async fn skills(&self) -> Result<Vec<Skill>, CoreError> {
        Ok(self.client.list_skills().await?)
    }

    pub async fn companies(&self) -> Result<Vec<Company>, CoreError> {
        Ok(self.client.list_companies().await?)
    }

    /// Vacancy count for a filter set, without touching poll state.
    pub async fn count(&self, query: &CountQuery) -> Result<u64, CoreError> {
        Ok(self.client.count(query).await?)
    }
}
