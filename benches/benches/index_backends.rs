// Copyright 2025 the Easel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use easel_index::{Aabb2D, FlatIndex, Index};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, world: f64, rect_w: f64, rect_h: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (world - rect_w).max(1.0);
        let y0 = rng.next_f64() * (world - rect_h).max(1.0);
        out.push(Aabb2D::from_xywh(x0, y0, rect_w, rect_h));
    }
    out
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Aabb2D::from_xywh(cx + dx, cy + dy, 8.0, 8.0));
        }
    }
    out
}

fn build_quad(rects: &[Aabb2D<f64>]) -> Index<u32> {
    let mut idx: Index<u32> = Index::new();
    for (i, aabb) in rects.iter().enumerate() {
        idx.insert(*aabb, i as u32);
    }
    idx
}

fn build_flat(rects: &[Aabb2D<f64>]) -> FlatIndex<f64, u32> {
    let mut idx: FlatIndex<f64, u32> = FlatIndex::new();
    for (i, aabb) in rects.iter().enumerate() {
        idx.insert(*aabb, i as u32);
    }
    idx
}

fn bench_build(c: &mut Criterion) {
    let rects = gen_grid_rects(64, 16.0); // 4096 boxes
    let mut group = c.benchmark_group("build/grid_4096");
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("quadtree", |b| {
        b.iter(|| black_box(build_quad(&rects)));
    });
    group.bench_function("flatvec", |b| {
        b.iter(|| black_box(build_flat(&rects)));
    });
    group.finish();
}

fn bench_query_rect(c: &mut Criterion) {
    let datasets = [
        ("grid_4096", gen_grid_rects(64, 16.0)),
        ("random_4096", gen_random_rects(4096, 1024.0, 24.0, 24.0)),
        ("clustered_4096", gen_clustered_rects(64, 64, 120.0)),
    ];
    for (name, rects) in datasets {
        let quad = build_quad(&rects);
        let flat = build_flat(&rects);
        let probe = Aabb2D::new(100.0, 100.0, 260.0, 260.0);

        let mut group = c.benchmark_group(format!("query_rect/{name}"));
        group.bench_function("quadtree", |b| {
            b.iter(|| black_box(quad.query_rect(black_box(probe)).count()));
        });
        group.bench_function("flatvec", |b| {
            b.iter(|| black_box(flat.query_rect(black_box(probe)).count()));
        });
        group.finish();
    }
}

fn bench_query_point(c: &mut Criterion) {
    let rects = gen_random_rects(4096, 1024.0, 24.0, 24.0);
    let quad = build_quad(&rects);
    let flat = build_flat(&rects);

    let mut group = c.benchmark_group("query_point/random_4096");
    group.bench_function("quadtree", |b| {
        b.iter(|| black_box(quad.query_point(black_box(512.0), black_box(512.0)).count()));
    });
    group.bench_function("flatvec", |b| {
        b.iter(|| black_box(flat.query_point(black_box(512.0), black_box(512.0)).count()));
    });
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let rects = gen_grid_rects(64, 16.0);
    let mut group = c.benchmark_group("update/grid_4096");
    group.throughput(Throughput::Elements(256));
    group.bench_function("quadtree", |b| {
        b.iter_batched(
            || {
                let mut idx: Index<u32> = Index::new();
                let keys: Vec<_> = rects
                    .iter()
                    .enumerate()
                    .map(|(i, aabb)| idx.insert(*aabb, i as u32))
                    .collect();
                (idx, keys)
            },
            |(mut idx, keys)| {
                for key in keys.iter().take(256) {
                    idx.update(*key, Aabb2D::from_xywh(2000.0, 2000.0, 16.0, 16.0));
                }
                black_box(idx)
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_query_rect,
    bench_query_point,
    bench_update
);
criterion_main!(benches);
