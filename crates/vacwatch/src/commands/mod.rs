//! Command dispatch: bridges CLI args -> core calls -> output formatting.

pub mod config_cmd;
pub mod daemon;
pub mod poll;
pub mod refs;
pub mod settings;
pub mod stats;
pub mod status;
pub mod util;
pub mod vacancies;

use crate::cli::{Command, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a command that needs the resolved configuration.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Poll => poll::handle(ctx, global).await,
        Command::Daemon => daemon::handle(ctx, global).await,
        Command::Status => status::handle(ctx, global),
        Command::Settings(args) => settings::handle(ctx, args, global).await,
        Command::Vacancies(args) => vacancies::handle(ctx, args, global).await,
        Command::Stats => stats::handle(ctx, global).await,
        Command::Refs(args) => refs::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command must be handled before dispatch".into(),
        )),
    }
}
