//! Vacancy command handlers.

use tabled::Tabled;
use vacwatch_core::{
    Dashboard, FilterForm, Listing, SettingsStore, Vacancy, VacancyQuery, VacancySummary,
    dashboard::{format_count, format_salary},
};

use crate::cli::{GlobalOpts, VacanciesArgs, VacanciesCommand, VacancyFilters};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

const MAX_PAGE_SIZE: u32 = 200;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VacancyRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Salary")]
    salary: String,
    #[tabled(rename = "Experience")]
    experience: String,
}

impl From<&VacancySummary> for VacancyRow {
    fn from(v: &VacancySummary) -> Self {
        Self {
            id: v.vacancy_id,
            title: v.title.clone(),
            company: v
                .company
                .as_ref()
                .map_or_else(|| "-".into(), |c| c.name.clone()),
            location: util::or_dash(v.location.as_deref()),
            salary: format_salary(v.salary_from, v.salary_to, v.currency.as_deref()),
            experience: v
                .experience
                .as_ref()
                .map_or_else(|| "-".into(), |e| e.name.clone()),
        }
    }
}

fn detail(v: &Vacancy) -> String {
    let s = &v.summary;
    let mut pairs = vec![
        ("ID", s.vacancy_id.to_string()),
        ("Title", s.title.clone()),
        (
            "Company",
            s.company.as_ref().map_or_else(|| "-".into(), |c| c.name.clone()),
        ),
        ("Location", util::or_dash(s.location.as_deref())),
        (
            "Salary",
            format_salary(s.salary_from, s.salary_to, s.currency.as_deref()),
        ),
        (
            "Experience",
            s.experience
                .as_ref()
                .map_or_else(|| "-".into(), |e| e.name.clone()),
        ),
        (
            "Work format",
            v.work_format
                .as_ref()
                .map_or_else(|| "-".into(), |f| f.name.clone()),
        ),
        (
            "Schedule",
            v.work_schedule
                .as_ref()
                .map_or_else(|| "-".into(), |w| w.name.clone()),
        ),
        ("Published", util::or_dash(s.published_date.as_deref())),
        ("Active", s.is_active.to_string()),
        ("Source", s.source_url.clone()),
    ];

    if !v.skills.is_empty() {
        let skills = v
            .skills
            .iter()
            .map(|sk| {
                let name = sk
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", sk.skill_id));
                if sk.is_mandatory {
                    format!("{name}*")
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        pairs.push(("Skills", skills));
    }

    let mut out = output::key_values(&pairs);
    if !s.description.trim().is_empty() {
        out.push_str("\n\n");
        out.push_str(s.description.trim());
    }
    out
}

/// Translate list flags into a query. `page` is 1-based on the command line.
fn build_query(filters: &VacancyFilters) -> Result<VacancyQuery, CliError> {
    if filters.page == 0 {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: "pages start at 1".into(),
        });
    }
    if !(1..=MAX_PAGE_SIZE).contains(&filters.limit) {
        return Err(CliError::Validation {
            field: "limit".into(),
            reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
        });
    }
    // Reject typos instead of silently dropping the filter.
    util::parse_amount("min-salary", filters.min_salary.as_deref())?;
    util::parse_amount("max-salary", filters.max_salary.as_deref())?;

    let mut listing = Listing::new();
    listing.form = FilterForm {
        title: filters.title.clone().unwrap_or_default(),
        location: filters.location.clone().unwrap_or_default(),
        min_salary: filters.min_salary.clone().unwrap_or_default(),
        max_salary: filters.max_salary.clone().unwrap_or_default(),
        experience_id: filters.experience,
        work_format_id: filters.work_format,
        work_schedule_id: filters.work_schedule,
        active_only: !filters.inactive,
        skill_ids: filters.skills.iter().copied().collect(),
    };
    listing.apply();

    let mut query = listing.query();
    query.limit = Some(filters.limit);
    query.offset = Some(u64::from(filters.page - 1) * u64::from(filters.limit));
    Ok(query)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: VacanciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VacanciesCommand::List(filters) => {
            let query = build_query(&filters)?;
            let dashboard = ctx.dashboard()?;

            let spinner = util::spinner("Loading vacancies...", global.quiet);
            let result = dashboard.vacancies(&query).await;
            util::finish(spinner);
            let rows = result?;

            if rows.is_empty() && global.output == crate::cli::OutputFormat::Table {
                if !global.quiet {
                    eprintln!("No vacancies match these filters.");
                }
                return Ok(());
            }
            let out = output::render_list(global.output, &rows, |v| VacancyRow::from(v), |v| {
                v.vacancy_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VacanciesCommand::Get { id } => {
            let dashboard = ctx.dashboard()?;
            let vacancy = match dashboard.vacancy(&id).await {
                Err(vacwatch_core::CoreError::NotFound { .. }) => {
                    return Err(CliError::NotFound {
                        resource_type: "vacancy".into(),
                        identifier: id,
                        list_command: "vacancies list".into(),
                    });
                }
                other => other?,
            };
            let out = output::render_single(global.output, &vacancy, detail, |v| {
                v.summary.vacancy_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VacanciesCommand::Count => {
            let store = ctx.open_store()?;
            let base = ctx.dashboard_base(store.as_ref());
            let dashboard = Dashboard::new(&base, &ctx.config.to_transport())?;
            let query = store.load().settings.count_query();
            let count = dashboard.count(&query).await?;

            let out = output::render_single(
                global.output,
                &serde_json::json!({ "count": count }),
                |_| format!("{} matching vacancies", format_count(count)),
                |_| count.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
