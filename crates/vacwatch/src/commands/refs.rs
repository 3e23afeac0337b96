//! `vacwatch refs`: reference data used by the listing filters.

use tabled::Tabled;

use crate::cli::{GlobalOpts, RefsArgs, RefsCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RefRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Extra")]
    extra: String,
}

pub async fn handle(ctx: &Context, args: RefsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = ctx.dashboard()?;
    let spinner = util::spinner("Loading reference data...", global.quiet);

    let out = match args.command {
        RefsCommand::Experiences => {
            let data = dashboard.experiences().await;
            util::finish(spinner);
            output::render_list(
                global.output,
                &data?,
                |e| RefRow {
                    id: e.experience_id,
                    name: e.name.clone(),
                    extra: e.order.to_string(),
                },
                |e| e.experience_id.to_string(),
            )
        }
        RefsCommand::WorkFormats => {
            let data = dashboard.work_formats().await;
            util::finish(spinner);
            output::render_list(
                global.output,
                &data?,
                |f| RefRow {
                    id: f.work_format_id,
                    name: f.name.clone(),
                    extra: String::new(),
                },
                |f| f.work_format_id.to_string(),
            )
        }
        RefsCommand::WorkSchedules => {
            let data = dashboard.work_schedules().await;
            util::finish(spinner);
            output::render_list(
                global.output,
                &data?,
                |w| RefRow {
                    id: w.work_schedule_id,
                    name: w.name.clone(),
                    extra: String::new(),
                },
                |w| w.work_schedule_id.to_string(),
            )
        }
        RefsCommand::Skills => {
            let data = dashboard.skills().await;
            util::finish(spinner);
            output::render_list(
                global.output,
                &data?,
                |s| RefRow {
                    id: s.skill_id,
                    name: s.name.clone(),
                    extra: util::or_dash(s.category.as_deref()),
                },
                |s| s.skill_id.to_string(),
            )
        }
        RefsCommand::Companies => {
            let data = dashboard.companies().await;
            util::finish(spinner);
            output::render_list(
                global.output,
                &data?,
                |c| RefRow {
                    id: c.company_id,
                    name: c.name.clone(),
                    extra: util::or_dash(c.website.as_deref()),
                },
                |c| c.company_id.to_string(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
