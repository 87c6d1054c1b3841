//! Benchmarks comparing the sequential, pool and farm encoders, plus decode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use huffpar_core::{decode, encode, FarmEncoder, ParallelEncoder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// English-like text over a skewed alphabet.
fn generate_text(size: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let alphabet = b"eeeeeetttaaoinshrdlu  ,.\n";
    (0..size)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [64 * 1024, 1024 * 1024, 8 * 1024 * 1024] {
        let text = generate_text(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", size), &text, |b, text| {
            b.iter(|| encode(black_box(text)))
        });

        for workers in [2, 4, 8] {
            let pool = ParallelEncoder::new(workers).expect("pool");
            group.bench_with_input(
                BenchmarkId::new(format!("pool-{workers}"), size),
                &text,
                |b, text| b.iter(|| pool.encode(black_box(text))),
            );

            let farm = FarmEncoder::new(workers).expect("farm");
            group.bench_with_input(
                BenchmarkId::new(format!("farm-{workers}"), size),
                &text,
                |b, text| b.iter(|| farm.encode(black_box(text))),
            );
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [64 * 1024, 1024 * 1024] {
        let encoded = encode(&generate_text(size)).expect("encode");
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| decode(black_box(encoded)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
