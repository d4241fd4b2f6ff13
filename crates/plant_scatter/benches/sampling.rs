mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use plant_scatter::grid::COLORS;
use plant_scatter::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DIM: usize = 128;
const CANOPY_DENSITIES: [usize; 3] = [250, 500, 1000];
const WORKERS: [usize; 3] = [1, 2, 4];

fn sampler() -> PinkNoiseSampler {
    PinkNoiseSampler {
        canopy_min_distance: 2.0,
        mid_min_distance: 1.5,
        undergrowth_min_distance: 1.0,
        grid_spacing: 1.0,
        rejection_budget: None,
    }
}

fn sample_all(grid: &mut SpatialGrid, pool: &WorkerPool, rng: &mut StdRng) -> usize {
    let sampler = sampler();
    let mut total = 0;
    for pass in PointPass::ORDERED {
        for color in 0..COLORS {
            total += sampler
                .sample_color(grid, color, pass, pool, rng)
                .expect("density fits the terrain");
        }
    }
    total
}

fn sampling_density_benches(c: &mut Criterion) {
    let pool = WorkerPool::new(None).expect("worker pool");
    let mut group = c.benchmark_group("sampling/pink_noise/canopy_points");

    for &canopy in &CANOPY_DENSITIES {
        group.throughput(common::elements_throughput(canopy * 3));
        group.bench_with_input(BenchmarkId::from_parameter(canopy), &canopy, |b, &canopy| {
            let mut rng = StdRng::seed_from_u64(0x5EED ^ canopy as u64);
            b.iter(|| {
                let mut grid = SpatialGrid::for_terrain((DIM, DIM), 10.0).expect("grid");
                grid.allocate_points(canopy, canopy * 2, &mut rng);
                black_box(sample_all(&mut grid, &pool, &mut rng));
            });
        });
    }

    group.finish();
}

fn sampling_worker_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling/pink_noise/workers");
    group.throughput(common::elements_throughput(3000));

    for &workers in &WORKERS {
        let pool = WorkerPool::new(Some(workers)).expect("worker pool");
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xC0105);
            b.iter(|| {
                let mut grid = SpatialGrid::for_terrain((DIM, DIM), 10.0).expect("grid");
                grid.allocate_points(1000, 2000, &mut rng);
                black_box(sample_all(&mut grid, &pool, &mut rng));
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampling_density_benches, sampling_worker_benches
}
criterion_main!(benches);
