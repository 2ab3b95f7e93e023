//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tool-call validator - danger scanning, schema repair and tool-name suggestions
#[derive(Parser, Debug)]
#[command(name = "tool-validator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "TOOL_VALIDATOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "TOOL_VALIDATOR_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "TOOL_VALIDATOR_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a single tool call and print the verdict
    Check {
        /// Tool name
        #[arg(short, long)]
        tool: String,

        /// Arguments as JSON (near-JSON is accepted)
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// Parameter schema as JSON
        #[arg(short, long)]
        schema: Option<String>,

        /// Tool names to treat as known (repeatable)
        #[arg(long = "known")]
        known: Vec<String>,
    },

    /// Run a JSON-lines file of tool calls through the hook pipeline
    Replay {
        /// File with one `{"name", "arguments", "schema"?, "error"?}` object per line
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Print the effective configuration as YAML
    Config,
}
