//! # Sway Performance Benchmarks
//!
//! Benchmarks for the pieces a practice session touches on every beat:
//! selection over the connection graph and announcement planning. Both
//! run between beats, so they must stay comfortably under a millisecond
//! even on large catalogs.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench selection
//! cargo bench announcer
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

use sway::announcer;
use sway::catalog::Catalog;
use sway::selector;

/// Build a densely connected catalog of the given size.
fn build_catalog(moves: usize) -> Catalog {
    let mut catalog = Catalog::default();
    for i in 0..moves {
        catalog
            .add_move(&format!("Move {i}"), "")
            .expect("Failed to add move");
    }
    let ids: Vec<String> = catalog.moves.iter().map(|m| m.id.clone()).collect();
    for (i, from) in ids.iter().enumerate() {
        // Eight outgoing edges per move with varied smoothness.
        for k in 1..=8 {
            let to = &ids[(i + k * 7) % ids.len()];
            let smoothness = (k % 5 + 1) as i32;
            catalog
                .upsert_connection(from, to, smoothness, k % 6 != 0, None)
                .expect("Failed to connect");
        }
    }
    catalog
}

fn benchmark_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    for size in [50usize, 200, 1000] {
        let catalog = build_catalog(size);
        let from = catalog.moves[0].clone();

        group.bench_with_input(BenchmarkId::new("uniform", size), &size, |b, _| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                selector::select_next(
                    black_box(&catalog.moves),
                    black_box(&catalog.connections),
                    black_box(&from),
                    false,
                    &mut rng,
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("weighted", size), &size, |b, _| {
            let mut rng = StdRng::seed_from_u64(7);
            b.iter(|| {
                selector::select_next(
                    black_box(&catalog.moves),
                    black_box(&catalog.connections),
                    black_box(&from),
                    true,
                    &mut rng,
                )
            });
        });
    }

    group.finish();
}

fn benchmark_announcer_planning(c: &mut Criterion) {
    let mut group = c.benchmark_group("announcer");

    let names = [
        ("short", "Dip"),
        ("typical", "Cross Body Lead"),
        ("long", "Reverse Cross Body Lead With Inside Turn And Hand Change"),
    ];

    for (label, name) in names {
        group.bench_function(BenchmarkId::new("plan", label), |b| {
            b.iter(|| announcer::plan_announcement(black_box(name), black_box(117.0)));
        });
    }

    group.finish();
}

fn benchmark_move_lookup(c: &mut Criterion) {
    let catalog = build_catalog(1000);

    c.bench_function("find_move_substring", |b| {
        b.iter(|| catalog.find_move(black_box("move 731")));
    });
}

criterion_group!(
    benches,
    benchmark_selection,
    benchmark_announcer_planning,
    benchmark_move_lookup
);
criterion_main!(benches);
