// Listing view state: the filter form being edited, the filters actually
// applied to the query, and the current page.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use vacwatch_api::VacancyQuery;

/// Rows per page.
pub const PAGE_SIZE: u32 = 20;

/// Filter controls as the user edits them.
///
/// Numeric inputs stay as typed text; values that do not parse are left
/// out of the query rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterForm {
    pub title: String,
    pub location: String,
    pub min_salary: String,
    pub max_salary: String,
    pub experience_id: Option<i64>,
    pub work_format_id: Option<i64>,
    pub work_schedule_id: Option<i64>,
    pub active_only: bool,
    pub skill_ids: IndexSet<i64>,
}

impl Default for FilterForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            location: String::new(),
            min_salary: String::new(),
            max_salary: String::new(),
            experience_id: None,
            work_format_id: None,
            work_schedule_id: None,
            active_only: true,
            skill_ids: IndexSet::new(),
        }
    }
}

impl FilterForm {
    /// Add or remove a skill. Returns whether it is now selected.
    pub fn toggle_skill(&mut self, skill_id: i64) -> bool {
        if self.skill_ids.shift_remove(&skill_id) {
            false
        } else {
            self.skill_ids.insert(skill_id);
            true
        }
    }

    pub fn has_skill(&self, skill_id: i64) -> bool {
        self.skill_ids.contains(&skill_id)
    }

    /// Query for `page` (zero-based).
    pub fn to_query(&self, page: u32) -> VacancyQuery {
        VacancyQuery {
            title: self.title.trim().to_owned(),
            location: self.location.trim().to_owned(),
            min_salary: parse_amount(&self.min_salary),
            max_salary: parse_amount(&self.max_salary),
            experience_id: self.experience_id,
            work_format_id: self.work_format_id,
            work_schedule_id: self.work_schedule_id,
            skill_ids: self.skill_ids.iter().copied().collect(),
            is_active: Some(self.active_only),
            offset: Some(u64::from(page) * u64::from(PAGE_SIZE)),
            limit: Some(PAGE_SIZE),
        }
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Form, applied filters and page for the vacancy listing.
///
/// Editing `form` never changes the query; only [`apply`](Self::apply)
/// and [`clear`](Self::clear) do, and both return to the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub form: FilterForm,
    applied: FilterForm,
    page: u32,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters the current query was built from.
    pub fn applied(&self) -> &FilterForm {
        &self.applied
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Whether the form has edits that are not applied yet.
    pub fn is_dirty(&self) -> bool {
        self.form != self.applied
    }

    pub fn toggle_skill(&mut self, skill_id: i64) -> bool {
        self.form.toggle_skill(skill_id)
    }

    /// Use the form as the new filter set and go back to the first page.
    pub fn apply(&mut self) {
        self.applied = self.form.clone();
        self.page = 0;
    }

    /// Reset form and applied filters and go back to the first page.
    pub fn clear(&mut self) {
        self.form = FilterForm::default();
        self.applied = FilterForm::default();
        self.page = 0;
    }

    /// Query for the current page, built from the applied filters only.
    pub fn query(&self) -> VacancyQuery {
        self.applied.to_query(self.page)
    }

    /// A short page means there is nothing after it. This is a heuristic:
    /// an exactly full last page still enables "next".
    pub fn has_next(last_page_len: usize) -> bool {
        u64::try_from(last_page_len).unwrap_or(u64::MAX) >= u64::from(PAGE_SIZE)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    /// Advance if the last fetched page was full. Returns whether the page moved.
    pub fn next_page(&mut self, last_page_len: usize) -> bool {
        if Self::has_next(last_page_len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns whether the page moved.
    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}
