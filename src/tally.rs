//! Per-provider counting and ranking.
//!
//! The count table only ever gains entries through increments, so a
//! provider present in the table always has a count of at least one, and
//! every key in it came out of the resolution map.

use std::collections::HashMap;

use serde::Serialize;

use crate::emails::domain_of;
use crate::errors::Result;
use crate::resolver::ResolutionMap;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub provider: String,
    pub count: u64,
}

/// Count table keyed by provider domain.
#[derive(Debug, Clone, Default)]
pub struct ProviderTally {
    map: HashMap<String, u64>,
}

impl ProviderTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a provider's count, creating the entry at 1 if absent.
    pub fn bump(&mut self, provider: &str) {
        *self.map.entry(provider.to_string()).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total of all counts.
    pub fn total(&self) -> u64 {
        self.map.values().sum()
    }

    /// Consume into ranked entries: count descending, then provider domain
    /// ascending so equal counts come out in a stable order.
    pub fn into_ranked(self) -> Vec<RankedEntry> {
        let mut entries: Vec<RankedEntry> = self
            .map
            .into_iter()
            .map(|(provider, count)| RankedEntry { provider, count })
            .collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.provider.cmp(&b.provider))
        });
        entries
    }
}

/// Result of the counting pass.
#[derive(Debug, Default)]
pub struct CountOutcome {
    pub tally: ProviderTally,
    /// Valid addresses whose domain never made it into the resolution map.
    pub unattributed: usize,
    /// Addresses that failed domain extraction under the lenient policy.
    pub extraction_failures: usize,
}

/// Walk the validated, deduplicated address list and tally each address
/// against its domain's provider. Addresses whose domain is absent from
/// the map are counted as unattributed. Extraction failures abort when
/// `strict`, otherwise they are skipped and counted.
pub fn count_providers(
    addresses: &[String],
    providers: &ResolutionMap,
    strict: bool,
) -> Result<CountOutcome> {
    let mut outcome = CountOutcome::default();
    for address in addresses {
        let domain = match domain_of(address) {
            Ok(d) => d,
            Err(e) if strict => return Err(e),
            Err(_) => {
                outcome.extraction_failures += 1;
                continue;
            }
        };
        match providers.get(domain) {
            Some(provider) => outcome.tally.bump(provider),
            None => outcome.unattributed += 1,
        }
    }
    Ok(outcome)
}
