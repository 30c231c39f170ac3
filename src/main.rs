mod app;
mod cli;
mod config;
mod emails;
mod errors;
mod input;
mod report;
mod resolver;
mod tally;

use std::sync::Arc;

use anyhow::Context;

use cli::{Cli, OutputFormat};
use config::Config;
use report::{ReportFormat, TallyReport, create_formatter};
use resolver::{MxLookup, SystemResolver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::from_args();

    // Load configuration (env first, CLI wins)
    let mut config = Config::from_env();
    config.merge_with_cli(&cli);
    config.validate().context("invalid configuration")?;

    let lines =
        input::read_addresses(cli.input.as_deref()).context("could not read the address list")?;
    if cli.is_trace() {
        eprintln!("Read {} candidate line(s)", lines.len());
    }

    let resolver: Arc<dyn MxLookup> = Arc::new(SystemResolver::new());
    let outcome = app::run_tally(lines, resolver, &config.pipeline_options())
        .await
        .context("tally pipeline failed")?;

    if cli.is_trace() {
        eprintln!(
            "{} unique domain(s): {} resolved, {} skipped ({} ms)",
            outcome.stats.resolution.domains,
            outcome.stats.resolution.resolved,
            outcome.skipped.len(),
            outcome.stats.duration_ms
        );
    }

    // Resolution gaps are never fatal, but they should be visible on request.
    if cli.warn_enabled() {
        for skipped in &outcome.skipped {
            eprintln!("warning: skipped {skipped}");
        }
        if outcome.stats.invalid_dropped > 0 {
            eprintln!(
                "warning: dropped {} invalid address(es)",
                outcome.stats.invalid_dropped
            );
        }
        if outcome.stats.addresses_unattributed > 0 {
            eprintln!(
                "warning: {} address(es) excluded from the counts (provider unknown)",
                outcome.stats.addresses_unattributed
            );
        }
    }

    let format = match cli.format {
        OutputFormat::Text => ReportFormat::Text,
        OutputFormat::Json => ReportFormat::Json,
    };
    let formatter = create_formatter(format);
    let report = TallyReport::from(outcome);
    print!("{}", formatter.format_report(&report)?);

    Ok(())
}
