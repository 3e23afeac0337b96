//! `vacwatch status`: the persisted result of the last poll.

use serde::Serialize;
use vacwatch_core::{PollSettings, PollState, SettingsStore};

use crate::cli::GlobalOpts;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusView {
    state_file: String,
    enabled: bool,
    interval_seconds: u64,
    #[serde(flatten)]
    state: PollState,
}

fn detail(view: &StatusView, color: bool) -> String {
    let error = match view.state.last_error {
        Some(ref e) => output::bad(e, color),
        None => output::good("none", color),
    };
    output::key_values(&[
        ("Status", util::or_dash(view.state.polling_status.as_deref())),
        ("Last checked", util::format_time(view.state.last_checked.as_ref())),
        (
            "Last count",
            view.state
                .last_count
                .map_or_else(|| "-".into(), |c| c.to_string()),
        ),
        ("Last error", error),
        ("Polling", if view.enabled { "enabled" } else { "disabled" }.into()),
        ("Interval", format!("{} sec", view.interval_seconds)),
        ("State file", output::dim(&view.state_file, color)),
    ])
}

pub fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let record = store.load();
    let settings: &PollSettings = &record.settings;

    let view = StatusView {
        state_file: store.path().display().to_string(),
        enabled: settings.enabled,
        interval_seconds: settings.effective_interval().as_secs(),
        state: record.state.clone(),
    };

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &view,
        |v| detail(v, color),
        |v| v.state.last_count.map_or_else(String::new, |c| c.to_string()),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
