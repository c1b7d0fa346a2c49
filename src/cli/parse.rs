//! CLI parse: clap types for Sweet. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sweet CLI - compose resolved package contexts into suites
#[derive(Parser)]
#[command(name = "sweet")]
#[command(about = "Compose resolved package contexts into conflict-resolved tool suites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saved suites
    Suites {
        /// Only this branch (default: every configured branch)
        #[arg(long)]
        branch: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the contexts of a saved suite, highest priority first
    Contexts {
        branch: String,
        suite: String,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the tools of a saved suite
    Tools {
        branch: String,
        suite: String,
        /// Include hidden, shadowed and missing tools
        #[arg(long)]
        all: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Run a visible tool of a suite file inside its context environment
    Run {
        suite_file: PathBuf,
        alias: String,
        /// Arguments passed through to the tool
        #[arg(last = true)]
        args: Vec<String>,
    },
}

impl Commands {
    /// Command name used in logs (e.g. "suites", "tools").
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Suites { .. } => "suites",
            Commands::Contexts { .. } => "contexts",
            Commands::Tools { .. } => "tools",
            Commands::Run { .. } => "run",
        }
    }
}
