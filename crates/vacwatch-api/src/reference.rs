// Read-only lookups: dashboard aggregates and reference lists.

use crate::client::VacancyClient;
use crate::error::Error;
use crate::types::{Company, DashboardStats, Experience, Skill, WorkFormat, WorkSchedule};

impl VacancyClient {
    /// `GET /stats/dashboard`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        let url = self.url("/stats/dashboard", &[])?;
        self.get(url).await
    }

    /// `GET /experiences`
    pub async fn list_experiences(&self) -> Result<Vec<Experience>, Error> {
        let url = self.url("/experiences", &[])?;
        self.get(url).await
    }

    /// `GET /work-formats`
    pub async fn list_work_formats(&self) -> Result<Vec<WorkFormat>, Error> {
        let url = self.url("/work-formats", &[])?;
        self.get(url).await
    }

    /// `GET /work-schedules`
    pub async fn list_work_schedules(&self) -> Result<Vec<WorkSchedule>, Error> {
        let url = self.url("/work-schedules", &[])?;
        self.get(url).await
    }

    /// `GET /skills`
    pub async fn list_skills(&self) -> Result<Vec<Skill>, Error> {
        let url = self.url("/skills", &[])?;
        self.get(url).await
    }

    /// `GET /companies`
    pub async fn list_companies(&self) -> Result<Vec<Company>, Error> {
        let url = self.url("/companies", &[])?;
        self.get(url).await
    }
}
