mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use plant_scatter::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const SPECIES_COUNTS: [usize; 4] = [1, 4, 8, 16];

fn viability_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecology/average_viability");
    let conditions = Conditions::constant(9.0, 42.0, 8.0, 15.0);

    for &count in &SPECIES_COUNTS {
        let table = common::species(count);
        group.throughput(common::elements_throughput(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let model = ViabilityModel::new(&table);
            b.iter(|| black_box(model.average_viability(black_box(&conditions))));
        });
    }

    group.finish();
}

fn roulette_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecology/roulette_spin");

    for &count in &SPECIES_COUNTS {
        let viabilities: Vec<f64> = (0..count).map(|i| (i as f64 + 1.0) / count as f64).collect();
        group.throughput(common::elements_throughput(1));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xB0B ^ count as u64);
            b.iter(|| {
                let selector = RouletteSelector::new(black_box(&viabilities));
                black_box(selector.spin(&mut rng))
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = viability_benches, roulette_benches
}
criterion_main!(benches);
