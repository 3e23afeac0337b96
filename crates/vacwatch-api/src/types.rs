//! Response and request types for the Vacancy API.
//!
//! Field names match the JSON produced by the API (snake_case). All
//! entities are read-only DTOs; nothing here is mutated client-side.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Reference entities ───────────────────────────────────────────────

/// Employer record — from `GET /companies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: i64,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Required experience level — from `GET /experiences`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub experience_id: i64,
    pub name: String,
    #[serde(default)]
    pub order: i64,
}

/// From `GET /work-formats` (remote, office, hybrid...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFormat {
    pub work_format_id: i64,
    pub name: String,
}

/// From `GET /work-schedules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub work_schedule_id: i64,
    pub name: String,
}

/// From `GET /skills`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

// ── Embedded references ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub company_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceRef {
    pub experience_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFormatRef {
    pub work_format_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkScheduleRef {
    pub work_schedule_id: i64,
    pub name: String,
}

/// Skill attached to a vacancy, flagged mandatory or nice-to-have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRef {
    pub skill_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
}

// ── Vacancies ────────────────────────────────────────────────────────

/// Listing row — from `GET /vacancies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancySummary {
    pub vacancy_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary_from: Option<f64>,
    #[serde(default)]
    pub salary_to: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub raw_address: Option<String>,
    #[serde(default)]
    pub parsed_address: Option<String>,
    pub source_url: String,
    /// ISO 8601 date-time as sent by the server.
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub company_id: i64,
    pub experience_id: i64,
    pub work_format_id: i64,
    pub work_schedule_id: i64,
    #[serde(default)]
    pub company: Option<CompanyRef>,
    #[serde(default)]
    pub experience: Option<ExperienceRef>,
}

/// Full vacancy — from `GET /vacancies/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(flatten)]
    pub summary: VacancySummary,
    #[serde(default)]
    pub work_format: Option<WorkFormatRef>,
    #[serde(default)]
    pub work_schedule: Option<WorkScheduleRef>,
    #[serde(default)]
    pub skills: Vec<SkillRef>,
}

fn default_true() -> bool {
    true
}

// ── Dashboard statistics ─────────────────────────────────────────────

/// Aggregates — from `GET /stats/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub overview: Overview,
    pub salary: SalarySummary,
    #[serde(default)]
    pub top_skills: Vec<SkillCount>,
    #[serde(default)]
    pub experience_distribution: Vec<ExperienceBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub total_vacancies: u64,
    pub active_vacancies: u64,
    pub total_companies: u64,
    pub total_skills: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalarySummary {
    pub with_salary: u64,
    #[serde(default)]
    pub average_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceBucket {
    pub experience: String,
    pub count: u64,
}

// ── Polling ──────────────────────────────────────────────────────────

/// Body of `GET /vacancies/count`.
///
/// Decoding is lenient: a missing, null, negative or non-numeric `count`
/// yields 0. Numeric strings and integral floats are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

impl CountResponse {
    /// Extract the count from an arbitrary JSON document.
    pub fn from_value(value: &Value) -> Self {
        let count = value.get("count").and_then(count_from_value).unwrap_or(0);
        Self { count }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn count_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Body of `POST /vacancies/polling-settings`.
///
/// Server-side defaults: `enabled = true`, `limit = 20` (1..=200),
/// `area = 1`, `only_with_salary = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingSettingsPush {
    pub enabled: bool,
    pub title: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub limit: u32,
    pub area: u32,
    pub only_with_salary: bool,
}

impl Default for PollingSettingsPush {
    fn default() -> Self {
        Self {
            enabled: true,
            title: None,
            location: None,
            min_salary: None,
            max_salary: None,
            limit: 20,
            area: 1,
            only_with_salary: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_is_lenient() {
        assert_eq!(CountResponse::from_value(&json!({"count": 12})).count, 12);
        assert_eq!(CountResponse::from_value(&json!({"count": "7"})).count, 7);
        assert_eq!(CountResponse::from_value(&json!({"count": 3.0})).count, 3);
        assert_eq!(CountResponse::from_value(&json!({"count": null})).count, 0);
        assert_eq!(CountResponse::from_value(&json!({"count": -4})).count, 0);
        assert_eq!(CountResponse::from_value(&json!({"count": "lots"})).count, 0);
        assert_eq!(CountResponse::from_value(&json!({})).count, 0);
        assert_eq!(CountResponse::from_value(&json!([1, 2])).count, 0);
    }

    #[test]
    fn detail_flattens_summary() {
        let raw = json!({
            "vacancy_id": 9,
            "title": "Rust engineer",
            "description": "Write Rust",
            "salary_from": 250000.0,
            "source_url": "https://example.com/9",
            "is_active": true,
            "company_id": 1,
            "experience_id": 2,
            "work_format_id": 3,
            "work_schedule_id": 4,
            "company": {"company_id": 1, "name": "Acme"},
            "work_format": {"work_format_id": 3, "name": "Remote"},
            "skills": [{"skill_id": 5, "name": "Rust", "is_mandatory": true}]
        });

        let vacancy: Vacancy = serde_json::from_value(raw).expect("valid vacancy");
        assert_eq!(vacancy.summary.vacancy_id, 9);
        assert_eq!(vacancy.summary.company.as_ref().map(|c| c.name.as_str()), Some("Acme"));
        assert_eq!(vacancy.summary.experience, None);
        assert_eq!(vacancy.skills.len(), 1);
        assert!(vacancy.skills[0].is_mandatory);
        assert_eq!(vacancy.work_schedule, None);
    }
}
