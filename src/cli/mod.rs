//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod context;
pub mod init;
pub mod scan;
pub mod status;

pub use args::{HistoryArgs, OutputFormat};
pub use context::CommandContext;

/// LabelCheck CLI - Companion for the LabelCheck ingredient-analysis platform
#[derive(Parser, Debug)]
#[command(name = "labelcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "LABELCHECK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "LABELCHECK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Custom API host for development/testing
    #[arg(long, global = true, env = "LABELCHECK_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "LABELCHECK_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize LabelCheck configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Submit and track label scans
    #[command(subcommand)]
    Scan(ScanCommands),

    /// Generate shell completions
    #[command(after_help = "\
Completions:
  bash:   labelcheck completion bash > /etc/bash_completion.d/labelcheck
  zsh:    labelcheck completion zsh > \"${fpath[1]}/_labelcheck\"
  fish:   labelcheck completion fish > ~/.config/fish/completions/labelcheck.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Scan subcommands
#[derive(Subcommand, Debug)]
pub enum ScanCommands {
    /// Upload a label photo and watch the analysis
    #[command(
        after_help = "EXAMPLES:\n  \
            labelcheck scan submit label.jpg              # Upload and watch\n  \
            labelcheck scan submit label.jpg --no-watch   # Upload only\n  \
            labelcheck scan submit label.jpg --timeout 60 # Bound the wait"
    )]
    Submit {
        /// Path to the captured label image (JPEG)
        image: String,

        /// Upload without watching for the analysis result
        #[arg(long)]
        no_watch: bool,

        /// Give up watching after this many seconds
        #[arg(long, conflicts_with = "no_watch")]
        timeout: Option<u64>,
    },

    /// Watch an in-flight scan until analysis completes
    Watch {
        /// Scan ID to watch
        scan_id: String,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the current status record for a scan
    #[command(visible_alias = "g")]
    Get {
        /// Scan ID
        scan_id: String,
    },

    /// List past scans, newest first
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            labelcheck scan history                 # First page\n  \
            labelcheck scan history -n 50           # Bigger page\n  \
            labelcheck scan history --offset 20     # Next page\n  \
            labelcheck scan history --all           # Everything"
    )]
    History {
        #[command(flatten)]
        pagination: HistoryArgs,
    },

    /// Re-run the analysis after preferences changed
    Reanalyze {
        /// Scan ID to reanalyze
        scan_id: String,

        /// Watch until the fresh analysis completes
        #[arg(long)]
        watch: bool,

        /// Give up watching after this many seconds
        #[arg(long, requires = "watch")]
        timeout: Option<u64>,
    },
}
