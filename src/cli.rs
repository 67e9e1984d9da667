use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal client for a Taskdeck workspace server.
/// Connection settings come from ~/.taskdeck/config.json, overridable per
/// invocation via the global flags below or TASKDECK_API_BASE / TASKDECK_TOKEN.
#[derive(Parser)]
#[command(name = "td", version, about = "Taskdeck workspace client")]
pub struct Cli {
    /// Base URL of the workspace server.
    #[arg(long, global = true, env = "TASKDECK_API_BASE")]
    pub api_base: Option<String>,

    /// Bearer token for the API.
    #[arg(long, global = true, env = "TASKDECK_TOKEN")]
    pub token: Option<String>,

    /// Path to the config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
