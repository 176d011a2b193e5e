use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "actuate", version)]
#[command(about = "Run Streaks actions through installed Shortcuts")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (default: $ACTUATE_CONFIG or the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Deadline for the whole run, retries included, e.g. 30s; 0 disables it
    #[arg(long, global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Retries after a failed attempt
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Initial wait between attempts; doubles after every failure
    #[arg(long, global = true, value_parser = parse_duration)]
    pub retry_wait: Option<Duration>,

    /// Output type requested from Shortcuts
    #[arg(long, global = true, value_name = "UTI")]
    pub output_type: Option<String>,

    /// App metadata snapshot (JSON) used to derive localized shortcut names
    #[arg(long, global = true, value_name = "PATH")]
    pub metadata: Option<PathBuf>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an action to a shortcut and run it
    Run(RunArgs),

    /// Run the first installed shortcut from an explicit candidate list
    Try(TryArgs),

    /// Inspect the action catalog
    Actions {
        #[command(subcommand)]
        command: ActionsCommand,
    },

    /// Map an action to a specific shortcut
    Link(LinkArgs),

    /// Remove an action mapping
    Unlink {
        /// Action id
        action: String,
    },

    /// Show persisted action mappings
    Links,

    /// Show which actions have an installed shortcut
    Coverage,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Task name substituted into shortcut names and sent as input
    #[arg(long)]
    pub task: Option<String>,

    /// Value for the `status` parameter
    #[arg(long)]
    pub status: Option<String>,

    /// Extra parameter as KEY=VALUE
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Raw input passed verbatim; `-` reads stdin
    #[arg(long, value_name = "TEXT")]
    pub input: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Action id, e.g. task-list
    pub action: String,

    #[command(flatten)]
    pub input: InputArgs,

    /// Run this shortcut instead of resolving one
    #[arg(long, value_name = "NAME")]
    pub shortcut: Option<String>,

    /// Resolve and print what would run
    #[arg(long)]
    pub dry_run: bool,

    /// Append a JSON-lines trace of the run to this file
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,

    /// Fail when an overridden or linked shortcut returns non-JSON output
    #[arg(long)]
    pub require_json: bool,

    /// Run without printing the shortcut output
    #[arg(long)]
    pub no_output: bool,
}

#[derive(Args, Debug)]
pub struct TryArgs {
    /// Action id
    pub action: String,

    /// Candidate shortcut names, tried in order
    #[arg(long = "candidate", value_name = "NAME", required = true)]
    pub candidates: Vec<String>,

    #[command(flatten)]
    pub input: InputArgs,

    /// Append a JSON-lines trace of the run to this file
    #[arg(long, value_name = "PATH")]
    pub trace: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ActionsCommand {
    /// List action ids and titles
    List,

    /// Show an action's payload, candidates and mapping
    Describe {
        /// Action id
        action: String,

        /// Task used to expand candidate names
        #[arg(long)]
        task: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Action id
    pub action: String,

    /// Shortcut name
    #[arg(long, alias = "shortcut-name", value_name = "NAME")]
    pub shortcut: Option<String>,

    /// Shortcut identifier
    #[arg(long, value_name = "ID")]
    pub shortcut_id: Option<String>,
}

/// humantime duration; a bare `0` means zero.
pub fn parse_duration(value: &str) -> Result<Duration, humantime::DurationError> {
    let value = value.trim();
    if value == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(value)
}

pub fn parse_key_value(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), val.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{value}'")),
    }
}
