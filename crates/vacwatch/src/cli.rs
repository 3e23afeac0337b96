//! Clap derive structures for the `vacwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! `build.rs` includes this file directly, so it may only depend on clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vacwatch -- watch a vacancy API for new openings
#[derive(Debug, Parser)]
#[command(
    name = "vacwatch",
    version,
    about = "Watch a vacancy API for new openings and browse the listings",
    long_about = "Polls a vacancy REST API on a timer, raises an alert when the number of\n\
        matching vacancies grows, and offers read-only views of the listings,\n\
        statistics and reference data.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "VACWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// State file holding poll settings and the last result
    #[arg(long, env = "VACWATCH_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Vacancy API base URL (overrides the stored one for this run)
    #[arg(long, env = "VACWATCH_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VACWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "VACWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the vacancy count once, now
    Poll,

    /// Poll on a timer until interrupted
    #[command(alias = "watch")]
    Daemon,

    /// Show the last poll result
    #[command(alias = "st")]
    Status,

    /// View or change poll settings
    Settings(SettingsArgs),

    /// Browse vacancies
    #[command(alias = "vac", alias = "v")]
    Vacancies(VacanciesArgs),

    /// Dashboard statistics
    Stats,

    /// Reference data used by the filters
    Refs(RefsArgs),

    /// Manage the CLI configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show stored poll settings
    Show,

    /// Change poll settings (use the global --api-base to change the API base)
    Set(SettingsSet),

    /// Restore the configured defaults
    Reset {
        /// Do not push the filters to the API after saving
        #[arg(long)]
        no_push: bool,
    },
}

#[derive(Debug, Args)]
pub struct SettingsSet {
    /// Title keyword
    #[arg(long)]
    pub title: Option<String>,

    /// Location
    #[arg(long)]
    pub location: Option<String>,

    /// Minimum salary (empty string clears it)
    #[arg(long)]
    pub min_salary: Option<String>,

    /// Maximum salary (empty string clears it)
    #[arg(long)]
    pub max_salary: Option<String>,

    /// Result limit sent with the count request (1-200)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Poll interval in seconds (minimum 10)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Turn polling on
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Turn polling off
    #[arg(long)]
    pub disable: bool,

    /// Do not push the filters to the API after saving
    #[arg(long)]
    pub no_push: bool,
}

// ── Vacancies ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VacanciesArgs {
    #[command(subcommand)]
    pub command: VacanciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum VacanciesCommand {
    /// List vacancies matching the filters
    #[command(alias = "ls")]
    List(VacancyFilters),

    /// Show one vacancy
    Get {
        /// Vacancy id (numeric)
        id: String,
    },

    /// Count vacancies matching the stored poll filters
    Count,
}

#[derive(Debug, Args)]
pub struct VacancyFilters {
    /// Title keyword
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Location
    #[arg(long)]
    pub location: Option<String>,

    /// Minimum salary
    #[arg(long)]
    pub min_salary: Option<String>,

    /// Maximum salary
    #[arg(long)]
    pub max_salary: Option<String>,

    /// Experience id (see `refs experiences`)
    #[arg(long)]
    pub experience: Option<i64>,

    /// Work format id (see `refs work-formats`)
    #[arg(long)]
    pub work_format: Option<i64>,

    /// Work schedule id (see `refs work-schedules`)
    #[arg(long)]
    pub work_schedule: Option<i64>,

    /// Skill id, repeatable (see `refs skills`)
    #[arg(long = "skill", short = 's')]
    pub skills: Vec<i64>,

    /// Show inactive vacancies instead of active ones
    #[arg(long)]
    pub inactive: bool,

    /// Page number, starting at 1
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Rows per page (1-200)
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: u32,
}

// ── Reference data ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RefsArgs {
    #[command(subcommand)]
    pub command: RefsCommand,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum RefsCommand {
    /// Experience levels
    Experiences,
    /// Work formats
    WorkFormats,
    /// Work schedules
    WorkSchedules,
    /// Skills
    Skills,
    /// Companies
    Companies,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init {
        /// Accept every default without prompting
        #[arg(long)]
        defaults: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config and state file paths
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
