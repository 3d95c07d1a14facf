//! CLI argument definitions for the Prefstore binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use prefstore::constants::{DEFAULT_API_BASE, DEFAULT_DOCUMENT_FILE, DEFAULT_TIMEOUT_SECS};

use crate::output::OutputFormat;

/// Where the store document lives
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// Remote gist (production)
    Gist,
    /// Local JSON file (development and backups)
    File,
}

/// Output format selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Operator tool for the Prefstore preference document
#[derive(Parser, Debug)]
#[command(name = "prefstore")]
#[command(about = "Inspect and maintain the Prefstore preference document")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: Format,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show user counts, backend and encryption status
    Info,
    /// Print one user's record
    Show(ShowArgs),
    /// Forget seen items older than a cutoff
    Prune(PruneArgs),
    /// Archive every stale weekly statistics block
    Rollover(RolloverArgs),
    /// Rewrite the document, encrypting every sensitive field with the configured key
    Reseal,
}

/// Connection settings shared by every command
#[derive(clap::Args, Debug)]
pub struct BackendArgs {
    /// Storage backend to use
    #[arg(short, long, global = true, default_value = "file", env = "PREFSTORE_BACKEND")]
    pub backend: Backend,

    /// Gist ID holding the document (required when backend=gist)
    #[arg(long, global = true, env = "PREFSTORE_DOCUMENT_ID")]
    pub document_id: Option<String>,

    /// Access token for the gist API
    #[arg(long, global = true, env = "PREFSTORE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Field encryption secret; plaintext storage when absent
    #[arg(long, global = true, env = "PREFSTORE_ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,

    /// Directory holding the document file (backend=file)
    #[arg(short = 'D', long, global = true, env = "PREFSTORE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name of the document file
    #[arg(long, global = true, default_value = DEFAULT_DOCUMENT_FILE, env = "PREFSTORE_FILE_NAME")]
    pub file_name: String,

    /// Base URL of the gist API
    #[arg(long, global = true, default_value = DEFAULT_API_BASE, env = "PREFSTORE_API_BASE")]
    pub api_base: String,

    /// Timeout in seconds for each remote call
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS, env = "PREFSTORE_TIMEOUT")]
    pub timeout: u64,
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// User key
    pub key: String,
}

/// Arguments for the prune command
#[derive(clap::Args, Debug)]
pub struct PruneArgs {
    /// Remove seen items first recorded more than this many days ago
    #[arg(long, default_value_t = 30)]
    pub max_age_days: u64,

    /// Report what would be removed without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the rollover command
#[derive(clap::Args, Debug)]
pub struct RolloverArgs {
    /// Report what would be archived without saving
    #[arg(long)]
    pub dry_run: bool,
}
