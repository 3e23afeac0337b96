//! `vacwatch poll`: one count check against the stored settings.

use std::sync::Arc;

use vacwatch_core::{FanoutNotifier, LogNotifier, PollOutcome, SettingsStore};

use crate::cli::GlobalOpts;
use crate::config::Context;
use crate::error::CliError;
use crate::notify::ConsoleNotifier;
use crate::output;

use super::util;

fn detail(outcome: &PollOutcome, color: bool) -> String {
    match outcome {
        PollOutcome::Skipped => "Polling is disabled; nothing was checked.".into(),
        PollOutcome::Checked {
            count,
            previous,
            delta,
        } => {
            let change = match delta {
                Some(d) => output::good(&format!("+{d} new"), color),
                None => output::dim("no new vacancies", color),
            };
            output::key_values(&[
                ("Count", count.to_string()),
                ("Previous", previous.to_string()),
                ("Change", change),
            ])
        }
        PollOutcome::Failed { message } => output::bad(message, color),
    }
}

fn plain(outcome: &PollOutcome) -> String {
    match outcome {
        PollOutcome::Checked { count, .. } => count.to_string(),
        PollOutcome::Skipped => "disabled".into(),
        PollOutcome::Failed { .. } => String::new(),
    }
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let store = ctx.open_store()?;
    store.install_defaults(&ctx.config.defaults.to_settings())?;

    let notifier = FanoutNotifier::new()
        .with(Arc::new(LogNotifier))
        .with(Arc::new(ConsoleNotifier::new(color, global.quiet)));
    let watcher = ctx.watcher(ctx.watcher_config(), store, Arc::new(notifier))?;

    let spinner = util::spinner("Checking vacancy count...", global.quiet);
    let outcome = watcher.poll_now().await;
    util::finish(spinner);

    if let PollOutcome::Failed { message } = outcome {
        return Err(CliError::PollFailed { message });
    }

    let out = output::render_single(global.output, &outcome, |o| detail(o, color), plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
