//! Config subcommand handlers.

use dialoguer::{Confirm, Input};
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Context};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_text(prompt: &str, default: &str) -> Result<String, CliError> {
    Input::new()
        .with_prompt(prompt)
        .default(default.to_owned())
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)
}

fn prompt_number(prompt: &str, default: u64) -> Result<u64, CliError> {
    Input::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .map_err(prompt_err)
}

/// Walk through the settings a new user is most likely to change.
fn wizard(mut cfg: Config) -> Result<Config, CliError> {
    cfg.defaults.api_base = prompt_text("Vacancy API base URL", &cfg.defaults.api_base)?;
    cfg.defaults.title = prompt_text("Title keyword to watch", &cfg.defaults.title)?;
    cfg.defaults.location = prompt_text("Location (empty for any)", &cfg.defaults.location)?;
    cfg.defaults.interval_seconds =
        prompt_number("Poll interval in seconds", cfg.defaults.interval_seconds)?;
    cfg.api.timeout_secs = prompt_number("Request timeout in seconds", cfg.api.timeout_secs)?;
    cfg.push.enabled = Confirm::new()
        .with_prompt("Push filter changes to the API?")
        .default(cfg.push.enabled)
        .interact()
        .map_err(prompt_err)?;
    Ok(cfg)
}

#[derive(Serialize)]
struct Paths {
    config: String,
    state: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { defaults, force } => {
            let path = config::config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let cfg = if defaults {
                Config::default()
            } else {
                eprintln!("vacwatch configuration");
                eprintln!("   Config path: {}\n", path.display());
                wizard(Config::default())?
            };
            cfg.validate()?;
            config::save_config(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let ctx = Context::load(global)?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&ctx.config).map_err(vacwatch_config::ConfigError::from)?
                }
                format => output::render_single(format, &ctx.config, |_| String::new(), |_| String::new()),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let ctx = Context::load(global)?;
            let paths = Paths {
                config: ctx.config_file.display().to_string(),
                state: ctx.state_file().display().to_string(),
            };
            let out = output::render_single(
                global.output,
                &paths,
                |p| output::key_values(&[("Config", p.config.clone()), ("State", p.state.clone())]),
                |p| p.config.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
