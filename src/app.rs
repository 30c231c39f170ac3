//! High-level pipeline façade providing library-consumable entry points.
//!
//! This abstracts the orchestration away from the binary so the whole
//! dedup -> validate -> extract -> resolve -> count -> rank flow can run (and
//! be tested) without a process boundary or a live resolver.
//!
//! Design goals:
//! - No side effects: printing and verbosity stay in the binary.
//! - The resolver enters through the `MxLookup` seam.
//! - Everything the run learned (counts, skips, stats) comes back in one
//!   `TallyOutcome`.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::emails;
use crate::errors::Result;
use crate::resolver::{self, MxLookup, ResolveOptions, ResolveStats, SkippedDomain};
use crate::tally::{self, RankedEntry};

/// Tunables for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Abort on an address without a domain separator instead of skipping
    /// it (the historical fatal variant).
    pub strict: bool,
    pub resolve: ResolveOptions,
}

/// Counters describing one full run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub lines_read: usize,
    pub duplicates_removed: usize,
    pub invalid_dropped: usize,
    /// Valid, deduplicated addresses that entered counting.
    pub addresses_considered: usize,
    /// Addresses whose domain never made it into the resolution map.
    pub addresses_unattributed: usize,
    /// Addresses skipped by the lenient malformed-address policy.
    pub extraction_failures: usize,
    pub resolution: ResolveStats,
    pub duration_ms: u64,
}

/// Everything a pipeline run produced.
#[derive(Debug)]
pub struct TallyOutcome {
    pub entries: Vec<RankedEntry>,
    pub skipped: Vec<SkippedDomain>,
    pub stats: PipelineStats,
}

/// Run the full pipeline over raw input lines.
pub async fn run_tally(
    lines: Vec<String>,
    resolver: Arc<dyn MxLookup>,
    opts: &PipelineOptions,
) -> Result<TallyOutcome> {
    let start = Instant::now();

    let lines_read = lines.len();
    let deduped = emails::unique(lines);
    let duplicates_removed = lines_read - deduped.len();

    let before_validation = deduped.len();
    let addresses = emails::valid(deduped);
    let invalid_dropped = before_validation - addresses.len();

    // Domain extraction under the active error policy; validated addresses
    // cannot fail here, but standalone callers may feed unvalidated input.
    let domains = if opts.strict {
        emails::unique_domains(&addresses)?
    } else {
        let mut domains = Vec::with_capacity(addresses.len());
        for address in &addresses {
            if let Ok(domain) = emails::domain_of(address) {
                domains.push(domain.to_string());
            }
        }
        emails::unique(domains)
    };

    let resolve_report = resolver::resolve_providers(resolver, domains, &opts.resolve).await;
    let counted = tally::count_providers(&addresses, &resolve_report.providers, opts.strict)?;

    let stats = PipelineStats {
        lines_read,
        duplicates_removed,
        invalid_dropped,
        addresses_considered: addresses.len(),
        addresses_unattributed: counted.unattributed,
        extraction_failures: counted.extraction_failures,
        resolution: resolve_report.stats,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok(TallyOutcome {
        entries: counted.tally.into_ranked(),
        skipped: resolve_report.skipped,
        stats,
    })
}
