//! Benchmarks for genre resolution
//!
//! Run with: cargo bench --package resolver
//!
//! Uses a synthetic dataset sized like a large production catalog.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::Dataset;
use resolver::PlaylistResolver;
use std::collections::BTreeSet;
use std::sync::Arc;

const GENRES: usize = 200;
const PLAYLISTS_PER_GENRE: usize = 50;

fn synthetic_dataset() -> Arc<Dataset> {
    let mut dataset = Dataset::new("misc");
    for g in 0..GENRES {
        let slugs: Vec<String> = (0..PLAYLISTS_PER_GENRE)
            // Neighbouring genres share half their playlists
            .map(|p| format!("pl-{}", g * PLAYLISTS_PER_GENRE / 2 + p))
            .collect();
        for slug in &slugs {
            dataset.insert_playlist(slug.clone(), format!("id-{}", slug));
        }
        dataset.insert_genre(format!("genre-{}", g), slugs);
    }
    dataset.insert_genre("misc", Vec::<String>::new());
    Arc::new(dataset)
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = PlaylistResolver::new(synthetic_dataset());
    let selected: BTreeSet<String> = (0..10).map(|g| format!("genre-{}", g * 7)).collect();
    let targets = BTreeSet::new();

    c.bench_function("invert_genre_set", |b| {
        b.iter(|| black_box(resolver.invert_genre_set(black_box(&selected))))
    });

    c.bench_function("resolve_playlist_sets", |b| {
        b.iter(|| {
            let sets = resolver
                .resolve(black_box(&targets), black_box(&selected))
                .unwrap();
            black_box(sets)
        })
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
