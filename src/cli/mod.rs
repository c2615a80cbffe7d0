//! CLI module for madmall-db
//!
//! Provides command-line interface for:
//! - migrate: run a migration plan from a config file
//! - validate: check one record read from stdin
//! - plan: print the built-in plan

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, LogFormat};
pub use commands::{init_tracing, migrate, plan, run, run_command, validate};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_json, write_response};
