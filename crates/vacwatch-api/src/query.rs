// Query-parameter builders for the filterable endpoints.
//
// Empty values never reach the wire: a blank string or `None` drops the
// key entirely instead of sending `title=`.

use serde::{Deserialize, Serialize};

/// Filters for `GET /vacancies/count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountQuery {
    pub title: String,
    pub location: String,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub limit: Option<u32>,
}

impl CountQuery {
    /// Non-empty fields as `(key, value)` pairs, in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        push_text(&mut params, "title", &self.title);
        push_text(&mut params, "location", &self.location);
        push_opt(&mut params, "min_salary", self.min_salary);
        push_opt(&mut params, "max_salary", self.max_salary);
        push_opt(&mut params, "limit", self.limit);
        params
    }
}

/// Filters and paging for `GET /vacancies`.
///
/// `skill_ids` is sent as a repeated key (`skill_ids=1&skill_ids=4`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyQuery {
    pub title: String,
    pub location: String,
    pub min_salary: Option<u64>,
    pub max_salary: Option<u64>,
    pub experience_id: Option<i64>,
    pub work_format_id: Option<i64>,
    pub work_schedule_id: Option<i64>,
    pub skill_ids: Vec<i64>,
    pub is_active: Option<bool>,
    pub offset: Option<u64>,
    pub limit: Option<u32>,
}

impl VacancyQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        push_text(&mut params, "title", &self.title);
        push_text(&mut params, "location", &self.location);
        push_opt(&mut params, "min_salary", self.min_salary);
        push_opt(&mut params, "max_salary", self.max_salary);
        push_opt(&mut params, "experience_id", self.experience_id);
        push_opt(&mut params, "work_format_id", self.work_format_id);
        push_opt(&mut params, "work_schedule_id", self.work_schedule_id);
        for id in &self.skill_ids {
            params.push(("skill_ids", id.to_string()));
        }
        push_opt(&mut params, "is_active", self.is_active);
        push_opt(&mut params, "offset", self.offset);
        push_opt(&mut params, "limit", self.limit);
        params
    }
}

fn push_text(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if !value.trim().is_empty() {
        params.push((key, value.to_owned()));
    }
}

fn push_opt<T: ToString>(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(v) = value {
        params.push((key, v.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(params: &[(&'static str, String)]) -> Vec<&'static str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn count_query_omits_empty_fields() {
        let query = CountQuery {
            title: "python".into(),
            location: "   ".into(),
            min_salary: None,
            max_salary: Some(300_000),
            limit: Some(20),
        };
        assert_eq!(keys(&query.to_params()), vec!["title", "max_salary", "limit"]);
    }

    #[test]
    fn count_query_empty_has_no_params() {
        assert!(CountQuery::default().to_params().is_empty());
    }

    #[test]
    fn count_query_keeps_value_untrimmed() {
        let query = CountQuery {
            title: " rust ".into(),
            ..CountQuery::default()
        };
        assert_eq!(query.to_params(), vec![("title", " rust ".to_owned())]);
    }

    #[test]
    fn vacancy_query_repeats_skill_ids() {
        let query = VacancyQuery {
            skill_ids: vec![3, 8],
            is_active: Some(false),
            offset: Some(0),
            limit: Some(20),
            ..VacancyQuery::default()
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("skill_ids", "3".to_owned()),
                ("skill_ids", "8".to_owned()),
                ("is_active", "false".to_owned()),
                ("offset", "0".to_owned()),
                ("limit", "20".to_owned()),
            ]
        );
    }
}
