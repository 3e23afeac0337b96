//! `vacwatch settings`: view and change the poll settings.
//!
//! Saving goes through the watcher, so the same rules apply as in the TUI:
//! validation first, then persist, re-arm, one immediate poll, and a
//! best-effort push of the filters to the API.

use std::sync::Arc;

use vacwatch_core::{
    LogNotifier, PollSettings, PushResult, SaveReport, SettingsStore, Watcher,
};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand, SettingsSet};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &PollSettings) -> String {
    output::key_values(&[
        ("API base", s.api_base.clone()),
        ("Title", util::or_dash(Some(&s.title))),
        ("Location", util::or_dash(Some(&s.location))),
        (
            "Min salary",
            s.min_salary.map_or_else(|| "-".into(), |v| v.to_string()),
        ),
        (
            "Max salary",
            s.max_salary.map_or_else(|| "-".into(), |v| v.to_string()),
        ),
        ("Limit", s.limit.to_string()),
        ("Interval", format!("{} sec", s.effective_interval().as_secs())),
        ("Enabled", s.enabled.to_string()),
    ])
}

/// Apply the flags given on the command line to `current`.
fn apply(
    mut settings: PollSettings,
    set: &SettingsSet,
    api_base: Option<&str>,
) -> Result<PollSettings, CliError> {
    if let Some(base) = api_base {
        settings.api_base = base.to_owned();
    }
    if let Some(ref title) = set.title {
        settings.title.clone_from(title);
    }
    if let Some(ref location) = set.location {
        settings.location.clone_from(location);
    }
    if let Some(min) = util::parse_amount("min-salary", set.min_salary.as_deref())? {
        settings.min_salary = min;
    }
    if let Some(max) = util::parse_amount("max-salary", set.max_salary.as_deref())? {
        settings.max_salary = max;
    }
    if let Some(limit) = set.limit {
        settings.limit = limit;
    }
    if let Some(interval) = set.interval {
        settings.interval_seconds = interval;
    }
    if set.enable {
        settings.enabled = true;
    }
    if set.disable {
        settings.enabled = false;
    }
    Ok(settings)
}

async fn save(
    ctx: &Context,
    global: &GlobalOpts,
    store: Arc<dyn SettingsStore>,
    settings: PollSettings,
    no_push: bool,
) -> Result<(), CliError> {
    let mut config = ctx.watcher_config();
    if no_push {
        config.push.enabled = false;
    }
    let watcher: Watcher = ctx.watcher(config, store, Arc::new(LogNotifier))?;

    let spinner = util::spinner("Saving settings...", global.quiet);
    let result = watcher.save_settings(settings).await;
    // Let the poll that follows a save finish before exiting.
    watcher.shutdown().await;
    util::finish(spinner);

    let SaveReport {
        interval_secs,
        push,
    } = result?;

    let color = output::should_color(global.color);
    if !global.quiet {
        eprintln!(
            "{} Polling every {interval_secs} sec.",
            output::good("Settings saved.", color)
        );
        match push {
            PushResult::Sent => eprintln!("Filters pushed to the API."),
            PushResult::Disabled => {}
            PushResult::Failed { message } => eprintln!(
                "{} {message}",
                output::bad("Could not push filters to the API (local save kept):", color)
            ),
        }
    }

    let out = output::render_single(
        global.output,
        &watcher.snapshot().settings,
        detail,
        |s| s.api_base.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(ctx: &Context, args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    store.install_defaults(&ctx.config.defaults.to_settings())?;

    match args.command {
        SettingsCommand::Show => {
            let settings = store.load().settings;
            let out =
                output::render_single(global.output, &settings, detail, |s| s.api_base.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set(set) => {
            let settings = apply(store.load().settings, &set, ctx.api_base_flag())?;
            save(ctx, global, store, settings, set.no_push).await
        }

        SettingsCommand::Reset { no_push } => {
            let defaults = ctx.config.defaults.to_settings();
            save(ctx, global, store, defaults, no_push).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> SettingsSet {
        SettingsSet {
            title: None,
            location: None,
            min_salary: None,
            max_salary: None,
            limit: None,
            interval: None,
            enable: false,
            disable: false,
            no_push: false,
        }
    }

    #[test]
    fn untouched_flags_keep_values() {
        let current = PollSettings {
            min_salary: Some(100),
            ..PollSettings::default()
        };
        let next = apply(current.clone(), &set(), None).expect("no flags");
        assert_eq!(next, current);
    }

    #[test]
    fn flags_override_and_clear() {
        let current = PollSettings {
            min_salary: Some(100),
            ..PollSettings::default()
        };
        let flags = SettingsSet {
            title: Some("rust".into()),
            min_salary: Some(String::new()),
            interval: Some(300),
            disable: true,
            ..set()
        };
        let next = apply(current, &flags, Some("http://api.test/v1")).expect("valid flags");
        assert_eq!(next.title, "rust");
        assert_eq!(next.min_salary, None);
        assert_eq!(next.interval_seconds, 300);
        assert!(!next.enabled);
        assert_eq!(next.api_base, "http://api.test/v1");
    }
}
