//! Address-list preparation: deduplication, validation, domain extraction.
//!
//! These are the synchronous front stages of the pipeline. They never touch
//! the network; everything here is pure string work so the resolver only
//! ever sees unique, syntactically plausible domains.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::errors::{MxTallyError, Result};

/// Conservative address grammar: printable local part, then DNS labels
/// (1-63 alphanumeric-or-hyphen chars, no leading/trailing hyphen) separated
/// by dots. Deliberately accepts single-label domains like `user@localhost`.
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("address pattern must compile")
});

/// Return the distinct values of `items`, each once, in first-seen order.
/// Idempotent; empty input yields empty output.
pub fn unique(items: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

/// Syntax check for a single candidate address: length strictly between
/// 2 and 255, and a match against the conservative grammar.
pub fn is_valid_address(candidate: &str) -> bool {
    candidate.len() > 2 && candidate.len() < 255 && ADDRESS_RE.is_match(candidate)
}

/// Keep only the syntactically acceptable addresses, preserving order.
/// Non-matching items are silently dropped; callers that want the drop
/// count can compare lengths.
pub fn valid(candidates: Vec<String>) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|c| is_valid_address(c))
        .collect()
}

/// Extract the domain part of an address: everything after the first `@`.
///
/// Defensive: in the intended pipeline the validator runs first and this
/// cannot fail, but the function must hold up when reused standalone.
pub fn domain_of(address: &str) -> Result<&str> {
    address
        .split_once('@')
        .map(|(_, domain)| domain)
        .ok_or_else(|| MxTallyError::invalid_address(address))
}

/// Unique domains of a validated address list, in first-seen order.
/// Propagates `InvalidAddress` from extraction (strict callers rely on it).
pub fn unique_domains(addresses: &[String]) -> Result<Vec<String>> {
    let mut domains = Vec::with_capacity(addresses.len());
    for address in addresses {
        domains.push(domain_of(address)?.to_string());
    }
    Ok(unique(domains))
}
