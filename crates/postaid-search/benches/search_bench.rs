//! Benchmarks for filtering and list views over large record sets.
//!
//! Run with: cargo bench -p postaid-search --bench search_bench
//!
//! Performance budgets:
//! - Chosung filter over 5K records: < 5ms
//! - List view with active query (5K records): < 10ms

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use postaid_core::{CanonicalOrder, Resident};
use postaid_search::{SearchScope, SearchState, filter};
use postaid_text::Query;
use std::hint::black_box;

// =============================================================================
// Fixtures
// =============================================================================

const SURNAMES: [&str; 6] = ["김", "이", "박", "최", "정", "강"];
const GIVEN: [&str; 6] = ["철수", "영희", "민수", "지우", "서연", "도윤"];

fn order() -> CanonicalOrder {
    CanonicalOrder::new(["월계로 169", "월계로 173", "월계로 175", "월계로 183"])
}

fn records(n: u64) -> Vec<Resident> {
    let buildings = ["월계로 169", "월계로 173 (광산구)", "월계로 175", "새빌라"];
    (0..n)
        .map(|i| {
            let i_usize = i as usize;
            Resident::new(
                i + 1,
                buildings[i_usize % buildings.len()],
                format!("{}", 101 + i % 40),
                format!(
                    "{}{}",
                    SURNAMES[i_usize % SURNAMES.len()],
                    GIVEN[(i_usize / SURNAMES.len()) % GIVEN.len()]
                ),
            )
        })
        .collect()
}

// =============================================================================
// Filter
// =============================================================================

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/filter");
    for n in [100u64, 1_000, 5_000] {
        let data = records(n);
        group.throughput(Throughput::Elements(n));
        for (label, raw) in [("chosung", "ㅊㅅ"), ("syllable", "영희"), ("unit", "12")] {
            let Some(query) = Query::parse(raw) else {
                continue;
            };
            group.bench_with_input(BenchmarkId::new(label, n), &data, |b, data| {
                b.iter(|| filter(black_box(data), Some(&query), SearchScope::All).len());
            });
        }
    }
    group.finish();
}

// =============================================================================
// List View
// =============================================================================

fn bench_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("search/view");
    let order = order();
    for n in [1_000u64, 5_000] {
        let data = records(n);
        let mut idle = SearchState::new();
        idle.expand("월계로 169");
        let mut active = SearchState::new();
        active.set_query("ㄱㅊ", &data, &order);

        group.bench_with_input(BenchmarkId::new("no_query", n), &data, |b, data| {
            b.iter(|| idle.view(black_box(data), &order).match_count);
        });
        group.bench_with_input(BenchmarkId::new("query", n), &data, |b, data| {
            b.iter(|| active.view(black_box(data), &order).match_count);
        });
    }
    group.finish();
}

criterion_group!(benches, bench_filter, bench_view);
criterion_main!(benches);
