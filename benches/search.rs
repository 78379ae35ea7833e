//! Search latency benchmarks over an address-like corpus.
//!
//! Run with: cargo bench
//!
//! The latency target is tens of milliseconds per query over ~10k
//! documents, reached structurally by the trie's query-length-bounded
//! descent rather than any corpus scan.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sift::{AddOptions, Index};
use tempfile::TempDir;

#[derive(Clone, Serialize, Deserialize)]
struct Address {
    id: u64,
    line: String,
    region: String,
}

const STREETS: &[&str] = &[
    "Dlouhá", "Krátká", "Havlíčkova", "Nádražní", "Školní", "Zahradní", "Polní", "Lipová",
    "Jiráskova", "Komenského", "Masarykova", "Tyršova", "Husova", "Palackého", "Riegrova",
];

const CITIES: &[&str] = &[
    "Praha", "Brno", "Ostrava", "Plzeň", "Liberec", "Olomouc", "Ústí nad Labem", "Hradec Králové",
    "Pardubice", "Zlín",
];

const REGIONS: &[&str] = &["sever", "jih", "vychod", "zapad"];

fn build_corpus(count: u64) -> Vec<Address> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| {
            let street = STREETS[rng.random_range(0..STREETS.len())];
            let number = rng.random_range(1..300);
            let city = CITIES[rng.random_range(0..CITIES.len())];
            Address {
                id: i + 1,
                line: format!("{street} {number}, {city}"),
                region: REGIONS[rng.random_range(0..REGIONS.len())].to_string(),
            }
        })
        .collect()
}

fn build_index(dir: &TempDir, corpus: &[Address]) -> Index<Address> {
    let index: Index<Address> = Index::open(dir.path()).unwrap();
    index
        .add_documents_with(
            corpus,
            |a| a.id,
            |a| a.line.clone(),
            AddOptions {
                boost: None,
                filter: Some(&|a: &Address| Some(a.region.clone())),
            },
        )
        .unwrap();
    index
}

fn bench_search(c: &mut Criterion) {
    let corpus = build_corpus(10_000);
    let dir = TempDir::new().unwrap();
    let index = build_index(&dir, &corpus);

    let mut group = c.benchmark_group("search_10k");

    for (name, query, filter) in [
        ("one_token", "havli", None),
        ("two_tokens", "dlouha praha", None),
        ("three_tokens", "kra 12 brno", None),
        ("filtered", "nadrazni", Some("sever jih")),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let results = index
                    .search(black_box(query), black_box(filter))
                    .unwrap();
                black_box(results)
            })
        });
    }

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let corpus = build_corpus(1_000);

    c.bench_function("index_1k_addresses", |b| {
        b.iter(|| {
            let dir = TempDir::new().unwrap();
            let index = build_index(&dir, &corpus);
            black_box(index.doc_count().unwrap())
        })
    });
}

criterion_group!(benches, bench_search, bench_indexing);
criterion_main!(benches);
