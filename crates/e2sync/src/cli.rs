//! Clap derive structures for the `e2sync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// e2sync -- command-line client for qmsk.e2 preset servers
#[derive(Debug, Parser)]
#[command(
    name = "e2sync",
    version,
    about = "Browse and switch qmsk.e2 presets from the command line",
    long_about = "Talks to a qmsk.e2 preset server over its JSON API.\n\n\
        Commands quote the server's sequence number; a rejected command\n\
        refreshes local state so the next attempt uses a fresh one.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "E2SYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile), e.g. http://192.168.0.10:8080
    #[arg(long, short = 'S', env = "E2SYNC_SERVER", global = true)]
    pub server: Option<String>,

    /// Push channel URL (default: server port + 1)
    #[arg(long, env = "E2SYNC_PUSH_URL", global = true)]
    pub push_url: Option<String>,

    /// Disable the push channel for `watch`
    #[arg(long, global = true)]
    pub no_push: bool,

    /// Config file (default: platform config dir)
    #[arg(long, env = "E2SYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "E2SYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "E2SYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// List presets
    #[command(alias = "ls")]
    Presets(PresetsArgs),

    /// Show sequence, safe flag and the active preset
    Status,

    /// List the server's sources
    Sources,

    /// Activate a preset
    Preset(PresetArgs),

    /// Cut to the active preset
    Cut,

    /// Auto-transition to the active preset
    Autotrans,

    /// Follow server state and the event log until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Presets ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PresetsArgs {
    /// Only presets in this group (case-insensitive; "Ungrouped" for none)
    #[arg(long, short = 'g')]
    pub group: Option<String>,
}

#[derive(Debug, Args)]
pub struct PresetArgs {
    /// Preset ID, e.g. `7` or `1.2`
    pub id: String,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Also print event log entries
    #[arg(long, short = 'e')]
    pub events: bool,

    /// Exit after this many snapshot updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a server profile to the config file
    Init {
        /// Server URL for the profile
        #[arg(long)]
        url: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,

        /// Replace an existing profile with the same name
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
