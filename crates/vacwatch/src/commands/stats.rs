//! `vacwatch stats`: dashboard overview.

use tabled::{Table, Tabled, settings::Style};
use vacwatch_core::{DashboardStats, dashboard::format_count};

use crate::cli::GlobalOpts;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vacancies")]
    count: String,
}

fn detail(stats: &DashboardStats) -> String {
    let o = &stats.overview;
    let average = stats
        .salary
        .average_salary
        .map_or_else(|| "No data".into(), |avg| format!("{avg:.0}"));

    let mut out = output::key_values(&[
        ("Total vacancies", format_count(o.total_vacancies)),
        ("Active vacancies", format_count(o.active_vacancies)),
        ("Companies", format_count(o.total_companies)),
        ("Skills", format_count(o.total_skills)),
        ("With salary", format_count(stats.salary.with_salary)),
        ("Average salary", average),
    ]);

    if !stats.top_skills.is_empty() {
        let rows: Vec<CountRow> = stats
            .top_skills
            .iter()
            .map(|s| CountRow {
                name: s.skill.clone(),
                count: format_count(s.count),
            })
            .collect();
        out.push_str("\n\nTop skills\n");
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }

    if !stats.experience_distribution.is_empty() {
        let rows: Vec<CountRow> = stats
            .experience_distribution
            .iter()
            .map(|b| CountRow {
                name: b.experience.clone(),
                count: format_count(b.count),
            })
            .collect();
        out.push_str("\n\nBy experience\n");
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }

    out
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = ctx.dashboard()?;

    let spinner = util::spinner("Loading statistics...", global.quiet);
    let result = dashboard.overview().await;
    util::finish(spinner);
    let stats = result?;

    let out = output::render_single(global.output, &stats, detail, |s| {
        s.overview.total_vacancies.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
