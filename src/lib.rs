//! mxtally library
//!
//! Resolve the mail-service provider behind each domain in a list of email
//! addresses (via MX lookups) and rank providers by how many addresses they
//! serve. The crate provides:
//!
//! - Address-list preparation (dedup, validation, domain extraction)
//! - Bounded-concurrency MX resolution behind a swappable lookup seam
//! - Provider counting and deterministic ranking
//! - Text and JSON report rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mxtally::app::{PipelineOptions, run_tally};
//! use mxtally::resolver::{MxLookup, SystemResolver};
//!
//! # async fn demo() -> Result<(), mxtally::errors::MxTallyError> {
//! let lines = vec!["someone@example.com".to_string()];
//! let resolver: Arc<dyn MxLookup> = Arc::new(SystemResolver::new());
//! let outcome = run_tally(lines, resolver, &PipelineOptions::default()).await?;
//! for entry in &outcome.entries {
//!     println!("{} {}", entry.provider, entry.count);
//! }
//! # Ok(())
//! # }
//! ```

// Re-export all modules for library use
pub mod app;
pub mod cli;
pub mod config;
pub mod emails;
pub mod errors;
pub mod input;
pub mod report;
pub mod resolver;
pub mod tally;

// Re-export commonly used types and functions for convenience
pub use app::{PipelineOptions, PipelineStats, TallyOutcome, run_tally};
pub use errors::{ErrorCategory, MxTallyError, Result};
pub use report::{ReportFormat, TallyReport};
pub use resolver::{MxLookup, ResolveOptions, SystemResolver, provider_domain};
pub use tally::{ProviderTally, RankedEntry};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
