// vacwatch-api: Async Rust client for the Vacancy REST API

pub mod client;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;

mod reference;
mod vacancies;

pub use client::VacancyClient;
pub use error::Error;
pub use query::{CountQuery, VacancyQuery};
pub use transport::TransportConfig;
pub use types::{
    Company, CompanyRef, CountResponse, DashboardStats, Experience, ExperienceBucket,
    ExperienceRef, Overview, PollingSettingsPush, SalarySummary, Skill, SkillCount, SkillRef,
    Vacancy, VacancySummary, WorkFormat, WorkFormatRef, WorkSchedule, WorkScheduleRef,
};

/// HTTP client type shared by everything that talks to the API.
pub use reqwest::Client as HttpClient;
