//! Page-turn benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use page_curl_engine::cache::{
    ChapterWindowCache, ContentProvider, InMemoryProvider, PerformanceTier,
};
use page_curl_engine::config::TurnConfiguration;
use page_curl_engine::geometry::PageMesh;
use page_curl_engine::physics::{PhysicsSimulator, TickOutcome};
use page_curl_engine::state::TurnDirection;

fn bench_turn_to_settle(c: &mut Criterion) {
    let config = TurnConfiguration::default();

    c.bench_function("turn_to_settle", |b| {
        b.iter(|| {
            let mut sim = PhysicsSimulator::new(black_box(&config));
            sim.start_turn(TurnDirection::Forward);
            while !matches!(sim.tick(1.0 / 60.0), TickOutcome::Settled { .. }) {}
            sim.progress()
        })
    });
}

fn bench_mesh_deform(c: &mut Criterion) {
    let mut mesh = PageMesh::new(20);

    c.bench_function("mesh_deform", |b| {
        b.iter(|| mesh.deform(black_box(0.4), TurnDirection::Forward, black_box(0.5)))
    });
}

fn bench_window_commit_cycle(c: &mut Criterion) {
    c.bench_function("window_commit_cycle", |b| {
        b.iter(|| {
            let mut provider = InMemoryProvider::numbered(50);
            let mut cache = ChapterWindowCache::new(50, PerformanceTier::Full);
            if let Some(first) = provider.load_chapter(0) {
                cache.initialize(0, first);
            }
            cache.preload_adjacent();
            cache.pump(&mut provider);
            while cache.commit_transition(TurnDirection::Forward) {
                cache.advance_clock(0.25);
                cache.pump(&mut provider);
            }
            black_box(cache.stats().evictions)
        })
    });
}

criterion_group!(
    benches,
    bench_turn_to_settle,
    bench_mesh_deform,
    bench_window_commit_cycle
);
criterion_main!(benches);
