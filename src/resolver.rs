//! Concurrent MX-based provider resolution.
//!
//! This module centralizes:
//! - The `MxLookup` seam over the actual DNS client (trust-dns-resolver)
//! - Canonicalization of an MX exchange host into a provider domain
//! - The bounded fan-out / fan-in pass over a set of unique domains
//!
//! Per-domain failures never surface as errors: a domain whose lookup
//! fails, times out, returns no records, or resolves to a host with too
//! few labels is recorded as a [`SkippedDomain`] and excluded from the
//! resolution map. The caller sees a smaller map plus the reasons.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::time::timeout;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

use crate::errors::{MxTallyError, Result};

/// Domain -> provider domain, populated only for domains whose MX lookup
/// succeeded with a qualifying exchange host.
pub type ResolutionMap = HashMap<String, String>;

/// Single MX record as it crosses the lookup seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxExchange {
    pub preference: u16,
    pub host: String,
}

impl MxExchange {
    pub fn new(preference: u16, host: impl Into<String>) -> Self {
        Self {
            preference,
            host: host.into(),
        }
    }
}

/// Seam over the MX lookup so the pipeline can run against a stub in tests.
#[async_trait]
pub trait MxLookup: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxExchange>>;
}

/// Production implementation backed by the host environment's resolver.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self {
            inner: TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()),
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MxLookup for SystemResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxExchange>> {
        let lookup = self
            .inner
            .mx_lookup(domain)
            .await
            .map_err(|e| MxTallyError::resolution(domain, e.to_string()))?;
        Ok(lookup
            .iter()
            .map(|mx| MxExchange::new(mx.preference(), mx.exchange().to_utf8()))
            .collect())
    }
}

/// Canonicalize an MX exchange host into a provider domain.
///
/// The trailing root dot is trimmed, the host split on `.`; hosts with
/// fewer than three labels yield no provider (too generic to attribute).
/// Otherwise the last two labels approximate the organization running the
/// mail infrastructure: `alt1.aspmx.l.google.com` -> `google.com`.
pub fn provider_domain(host: &str) -> Option<String> {
    let trimmed = host.trim_end_matches('.');
    let labels: Vec<&str> = trimmed.split('.').collect();
    if labels.len() < 3 {
        return None;
    }
    Some(format!(
        "{}.{}",
        labels[labels.len() - 2],
        labels[labels.len() - 1]
    ))
}

/// Tunables for the resolution pass.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Upper bound on a single MX lookup before it is abandoned.
    pub lookup_timeout: Duration,
    /// Maximum number of lookups in flight at once.
    pub max_concurrent: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            max_concurrent: 16,
        }
    }
}

/// Why a domain was excluded from the resolution map.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// Resolver error (NXDOMAIN, SERVFAIL, transport problems, ...).
    LookupFailed(String),
    /// The lookup exceeded the configured timeout.
    TimedOut,
    /// The lookup succeeded but returned an empty record set.
    NoRecords,
    /// The exchange host had fewer than three labels.
    HostTooShort(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::LookupFailed(reason) => write!(f, "lookup failed: {reason}"),
            SkipReason::TimedOut => write!(f, "lookup timed out"),
            SkipReason::NoRecords => write!(f, "no MX records"),
            SkipReason::HostTooShort(host) => {
                write!(f, "exchange host '{host}' has too few labels")
            }
        }
    }
}

/// One excluded domain with its reason; surfaces the otherwise-silent gaps.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDomain {
    pub domain: String,
    pub reason: SkipReason,
}

impl std::fmt::Display for SkippedDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.domain, self.reason)
    }
}

/// Counters describing one resolution pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveStats {
    pub domains: usize,
    pub resolved: usize,
    pub lookup_failures: usize,
    pub timeouts: usize,
    pub empty_record_sets: usize,
    pub short_hosts: usize,
}

/// Outcome of a resolution pass: the map plus everything that fell out.
#[derive(Debug, Default)]
pub struct ResolveReport {
    pub providers: ResolutionMap,
    pub skipped: Vec<SkippedDomain>,
    pub stats: ResolveStats,
}

enum UnitOutcome {
    Mapped(String),
    Skipped(SkipReason),
}

/// Resolve every unique domain to its provider domain.
///
/// One task per domain, admission-limited by a semaphore; each task wraps
/// its lookup in a timeout and reports over the channel. The single
/// receiver below owns the map, so there is never more than one writer.
/// The channel closes once every task has dropped its sender, which is the
/// fan-in barrier: no partial result is ever returned early.
pub async fn resolve_providers(
    resolver: Arc<dyn MxLookup>,
    domains: Vec<String>,
    opts: &ResolveOptions,
) -> ResolveReport {
    let mut report = ResolveReport {
        stats: ResolveStats {
            domains: domains.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    let semaphore = Arc::new(Semaphore::new(opts.max_concurrent.max(1)));
    let (tx, mut rx) = mpsc::channel::<(String, UnitOutcome)>(domains.len().max(1));
    let lookup_timeout = opts.lookup_timeout;

    for domain in domains {
        let resolver = Arc::clone(&resolver);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            let outcome = match timeout(lookup_timeout, resolver.lookup_mx(&domain)).await {
                Ok(Ok(records)) => attribute(records),
                Ok(Err(e)) => UnitOutcome::Skipped(SkipReason::LookupFailed(e.to_string())),
                Err(_) => UnitOutcome::Skipped(SkipReason::TimedOut),
            };
            let _ = tx.send((domain, outcome)).await;
        });
    }
    drop(tx);

    while let Some((domain, outcome)) = rx.recv().await {
        match outcome {
            UnitOutcome::Mapped(provider) => {
                report.stats.resolved += 1;
                report.providers.insert(domain, provider);
            }
            UnitOutcome::Skipped(reason) => {
                match &reason {
                    SkipReason::LookupFailed(_) => report.stats.lookup_failures += 1,
                    SkipReason::TimedOut => report.stats.timeouts += 1,
                    SkipReason::NoRecords => report.stats.empty_record_sets += 1,
                    SkipReason::HostTooShort(_) => report.stats.short_hosts += 1,
                }
                report.skipped.push(SkippedDomain { domain, reason });
            }
        }
    }

    report
}

/// Pick the winning record and canonicalize it. Records are ordered by
/// (preference, exchange) first, a deliberate deviation from taking the
/// resolver's first record as-is.
fn attribute(mut records: Vec<MxExchange>) -> UnitOutcome {
    if records.is_empty() {
        return UnitOutcome::Skipped(SkipReason::NoRecords);
    }
    records.sort_by(|a, b| a.preference.cmp(&b.preference).then_with(|| a.host.cmp(&b.host)));
    let winner = &records[0];
    match provider_domain(&winner.host) {
        Some(provider) => UnitOutcome::Mapped(provider),
        None => UnitOutcome::Skipped(SkipReason::HostTooShort(winner.host.clone())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned-answer resolver for pipeline tests; optionally sleeps to
    /// exercise the timeout and concurrency paths.
    pub(crate) struct StubResolver {
        answers: HashMap<String, Vec<MxExchange>>,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubResolver {
        pub(crate) fn new(answers: HashMap<String, Vec<MxExchange>>) -> Self {
            Self {
                answers,
                delay: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn max_observed(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MxLookup for StubResolver {
        async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxExchange>> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.answers
                .get(domain)
                .cloned()
                .ok_or_else(|| MxTallyError::resolution(domain, "NXDOMAIN"))
        }
    }

    pub(crate) fn answers(entries: &[(&str, &[(u16, &str)])]) -> HashMap<String, Vec<MxExchange>> {
        entries
            .iter()
            .map(|(domain, records)| {
                (
                    domain.to_string(),
                    records
                        .iter()
                        .map(|(pref, host)| MxExchange::new(*pref, *host))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn provider_domain_canonicalization() {
        assert_eq!(
            provider_domain("alt1.aspmx.l.google.com").as_deref(),
            Some("google.com")
        );
        assert_eq!(
            provider_domain("alt1.aspmx.l.google.com.").as_deref(),
            Some("google.com")
        );
        assert_eq!(
            provider_domain("mta5.am0.yahoodns.net").as_deref(),
            Some("yahoodns.net")
        );
        assert_eq!(provider_domain("mail.com"), None);
        assert_eq!(provider_domain("localhost"), None);
        assert_eq!(provider_domain("a.b.c").as_deref(), Some("b.c"));
    }

    #[tokio::test]
    async fn resolve_maps_and_skips() {
        let stub = StubResolver::new(answers(&[
            ("x.com", &[(10, "alt1.aspmx.l.google.com.")]),
            ("short.com", &[(10, "mail.com.")]),
            ("empty.com", &[]),
        ]));
        let domains = vec![
            "x.com".to_string(),
            "short.com".to_string(),
            "empty.com".to_string(),
            "missing.com".to_string(),
        ];
        let report =
            resolve_providers(Arc::new(stub), domains, &ResolveOptions::default()).await;

        assert_eq!(report.providers.len(), 1);
        assert_eq!(report.providers["x.com"], "google.com");
        assert_eq!(report.stats.domains, 4);
        assert_eq!(report.stats.resolved, 1);
        assert_eq!(report.stats.lookup_failures, 1);
        assert_eq!(report.stats.empty_record_sets, 1);
        assert_eq!(report.stats.short_hosts, 1);
        // barrier: every domain is accounted for, mapped or skipped
        assert_eq!(report.providers.len() + report.skipped.len(), 4);
    }

    #[tokio::test]
    async fn lowest_preference_record_wins() {
        let stub = StubResolver::new(answers(&[(
            "x.com",
            &[
                (20, "backup.fallbackmail.example.net."),
                (10, "alt1.aspmx.l.google.com."),
            ],
        )]));
        let report = resolve_providers(
            Arc::new(stub),
            vec!["x.com".to_string()],
            &ResolveOptions::default(),
        )
        .await;
        assert_eq!(report.providers["x.com"], "google.com");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_stays_bounded() {
        let canned: Vec<(String, Vec<MxExchange>)> = (0..20)
            .map(|i| {
                (
                    format!("domain{i}.com"),
                    vec![MxExchange::new(10, "mx.provider.example.com.")],
                )
            })
            .collect();
        let stub = Arc::new(
            StubResolver::new(canned.iter().cloned().collect())
                .with_delay(Duration::from_millis(5)),
        );
        let domains: Vec<String> = canned.iter().map(|(d, _)| d.clone()).collect();
        let opts = ResolveOptions {
            max_concurrent: 3,
            ..Default::default()
        };
        let report = resolve_providers(stub.clone(), domains, &opts).await;
        assert_eq!(report.stats.resolved, 20);
        assert!(
            stub.max_observed() <= 3,
            "observed {} concurrent lookups",
            stub.max_observed()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hung_lookup_becomes_timeout_skip() {
        let stub = StubResolver::new(answers(&[(
            "slow.com",
            &[(10, "mx.provider.example.com.")],
        )]))
        .with_delay(Duration::from_secs(3600));
        let opts = ResolveOptions {
            lookup_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let report =
            resolve_providers(Arc::new(stub), vec!["slow.com".to_string()], &opts).await;
        assert!(report.providers.is_empty());
        assert_eq!(report.stats.timeouts, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::TimedOut);
    }
}
