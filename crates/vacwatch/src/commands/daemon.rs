//! `vacwatch daemon`: run the watcher until Ctrl-C.
//!
//! Polls on the stored interval, follows edits made to the state file by
//! other vacwatch processes, and prints one line per completed check.

use std::sync::Arc;

use vacwatch_core::{FanoutNotifier, LogNotifier, PollState, Record};

use crate::cli::GlobalOpts;
use crate::config::Context;
use crate::error::CliError;
use crate::notify::ConsoleNotifier;
use crate::output;

use super::util;

fn status_line(state: &PollState, color: bool) -> String {
    let when = util::format_time(state.last_checked.as_ref());
    match state.last_error {
        Some(ref err) => format!("{when}  {}", output::bad(err, color)),
        None => format!(
            "{when}  count {}",
            state.last_count.map_or_else(|| "-".into(), |c| c.to_string())
        ),
    }
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    let store = ctx.open_store()?;
    let notifier = FanoutNotifier::new()
        .with(Arc::new(LogNotifier))
        .with(Arc::new(ConsoleNotifier::new(color, global.quiet)));
    let watcher = ctx.watcher(ctx.watcher_config(), store, Arc::new(notifier))?;

    let mut updates = watcher.subscribe();
    watcher.start().await?;
    watcher.watch_external().await;

    let Record { settings, state } = watcher.snapshot();
    if !global.quiet {
        eprintln!(
            "Watching {} for '{}' every {} sec (Ctrl-C to stop)",
            settings.api_base,
            settings.title,
            settings.effective_interval().as_secs()
        );
        println!("{}", status_line(&state, color));
    }
    let mut last_seen = state.last_checked;
    updates.mark_unchanged();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().state.clone();
                if state.last_checked != last_seen {
                    last_seen = state.last_checked;
                    if !global.quiet {
                        println!("{}", status_line(&state, color));
                    }
                }
            }
        }
    }

    tracing::info!("shutting down");
    watcher.shutdown().await;
    Ok(())
}
