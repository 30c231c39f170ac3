use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line interface definition.
///
/// Verbosity levels:
/// 0 - silent (only the final report)
/// 1 - errors (default)
/// 2 - warnings + errors (includes skipped-domain summaries)
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Rank mail-service providers by how many addresses in a list route through them"
)]
pub struct Cli {
    /// Path to a newline-delimited address list; standard input is read when omitted.
    pub input: Option<PathBuf>,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Seconds allowed for a single MX lookup before it is abandoned
    #[arg(long = "lookup-timeout", value_name = "SECS")]
    pub lookup_timeout: Option<u64>,

    /// Maximum number of MX lookups in flight at once
    #[arg(long = "max-concurrent", value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Abort the run on an address that reaches domain extraction without
    /// a domain separator, instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Report rendering selected on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }
}
