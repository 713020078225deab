//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary (default)
    #[default]
    Text,
    /// JSON (same as --json)
    Json,
}

pub mod commands;

/// tshare - share coding-assistant transcripts without leaking your machine
#[derive(Parser, Debug)]
#[command(name = "tshare", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Share store directory (default: ~/.tshare/shares)
    #[arg(long, global = true, env = "TSHARE_STORE")]
    pub store: Option<PathBuf>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (text, json)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitize a transcript and publish it (or write it with --output)
    Export(ExportArgs),

    /// Import a shared transcript under fresh identifiers
    Import(ImportArgs),

    /// Redact secrets from stdin and write the result to stdout
    Redact {
        /// Also rewrite paths under this directory to relative form
        #[arg(long)]
        base_path: Option<String>,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Export / Import
// ============================================================================

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Transcript file to export
    pub source: PathBuf,

    /// Directory paths are made relative to (default: first user record's working directory)
    #[arg(long)]
    pub base_path: Option<String>,

    /// Write the sanitized transcript here instead of publishing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Name to publish under (default: source file name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Share id to fetch from the store
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub id: Option<String>,

    /// Import a transcript file instead of a share
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Project directory the transcript belongs to (default: current directory)
    #[arg(long)]
    pub target_dir: Option<String>,

    /// Root of the per-project transcript directories (default: ~/.tshare/projects)
    #[arg(long, env = "TSHARE_PROJECTS_DIR")]
    pub projects_dir: Option<PathBuf>,
}
