//! Benchmarks for related-anime ranking
//!
//! Run with: cargo bench --package recommend

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{Anime, Ratings};
use recommend::{rank_related, SimilarityWeights};

const GENRES: [&str; 8] = [
    "Action", "Adventure", "Comedy", "Drama", "Fantasy", "Romance", "Sci-Fi", "Mystery",
];

fn generate(rows: u32) -> Vec<Anime> {
    (1..=rows)
        .map(|id| {
            let mut a = Anime::new(
                id,
                format!("Title {id}"),
                Ratings {
                    site: (id % 100) as f32 / 10.0,
                    ..Ratings::default()
                },
            );
            let i = id as usize;
            a.genres = vec![GENRES[i % 8].to_string(), GENRES[(i / 8) % 8].to_string()];
            a.studios = vec![format!("Studio {}", i % 30)];
            a
        })
        .collect()
}

fn bench_rank_related(c: &mut Criterion) {
    let all = generate(5_000);
    let target = all[0].clone();
    let weights = SimilarityWeights::default();

    c.bench_function("rank_related_5k", |b| {
        b.iter(|| black_box(rank_related(black_box(&target), &all, &weights, 10)))
    });
}

criterion_group!(benches, bench_rank_related);
criterion_main!(benches);
