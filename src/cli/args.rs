//! CLI argument definitions using clap
//!
//! Commands:
//! - madmall-db migrate --config <path> [--plan <path>] [--dry-run]
//! - madmall-db validate [--entity-type <TYPE>]
//! - madmall-db plan

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// madmall-db - single-table persistence core of the MADMall platform
#[derive(Parser, Debug)]
#[command(name = "madmall-db")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a migration plan against the configured source
    Migrate {
        /// Path to migration configuration file
        #[arg(long, default_value = "./madmall-migration.json")]
        config: PathBuf,

        /// Plan file; the built-in plan when omitted
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Transform and validate without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate one JSON record read from stdin
    Validate {
        /// Check against this entity schema instead of the record's entityType
        #[arg(long)]
        entity_type: Option<String>,
    },

    /// Print the built-in migration plan as JSON
    Plan,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
