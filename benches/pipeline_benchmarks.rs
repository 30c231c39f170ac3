//! Performance benchmarks for mxtally components.
//!
//! These benchmarks measure the synchronous stages of the pipeline
//! (deduplication, validation, canonicalization, counting) so the tool
//! stays fast on large address lists.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::collections::HashMap;

use mxtally::emails;
use mxtally::resolver::provider_domain;
use mxtally::tally::count_providers;

/// Generate a synthetic address list with duplicates and a share of junk.
fn generate_addresses(count: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        match i % 10 {
            // repeated address to exercise dedup
            0 => out.push("repeat@bulk.example.com".to_string()),
            // malformed line to exercise validation
            1 => out.push(format!("not an address {i}")),
            _ => out.push(format!("user{}@domain{}.example.com", i, i % 50)),
        }
    }
    out
}

fn bench_unique(c: &mut Criterion) {
    let mut group = c.benchmark_group("unique");
    for size in [1_000, 10_000] {
        let addresses = generate_addresses(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &addresses, |b, input| {
            b.iter(|| emails::unique(black_box(input.clone())));
        });
    }
    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");
    for size in [1_000, 10_000] {
        let addresses = generate_addresses(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &addresses, |b, input| {
            b.iter(|| emails::valid(black_box(input.clone())));
        });
    }
    group.finish();
}

fn bench_provider_domain(c: &mut Criterion) {
    let hosts = [
        "alt1.aspmx.l.google.com.",
        "mta5.am0.yahoodns.net.",
        "mail.com.",
        "mx01.mail.icloud.com.",
    ];
    c.bench_function("provider_domain", |b| {
        b.iter(|| {
            for host in &hosts {
                black_box(provider_domain(black_box(host)));
            }
        });
    });
}

fn bench_counting(c: &mut Criterion) {
    let addresses = emails::valid(generate_addresses(10_000));
    let providers: HashMap<String, String> = (0..50)
        .map(|i| {
            (
                format!("domain{i}.example.com"),
                format!("provider{}.example", i % 5),
            )
        })
        .collect();

    let mut group = c.benchmark_group("counting");
    group.throughput(Throughput::Elements(addresses.len() as u64));
    group.bench_function("count_providers", |b| {
        b.iter(|| count_providers(black_box(&addresses), black_box(&providers), false).unwrap());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_unique,
    bench_validation,
    bench_provider_domain,
    bench_counting
);
criterion_main!(benches);
