use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use ndtile_array::{AlignedBuffer, StridedLayout};
use ndtile_ops::{compact, ewise, reduce};
use rand::Rng;

fn random_buffer(rng: &mut impl Rng, size: usize) -> AlignedBuffer {
    let data: Vec<f32> = (0..size).map(|_| rng.random::<f32>()).collect();
    AlignedBuffer::from_slice(&data).unwrap()
}

fn bench_ewise(c: &mut Criterion) {
    let mut group = c.benchmark_group("ewise");
    let mut rng = rand::rng();

    for size in [1024, 16384, 262144] {
        let a = random_buffer(&mut rng, size);
        let b = random_buffer(&mut rng, size);
        let mut out = AlignedBuffer::new(size).unwrap();

        group.bench_function(format!("add_{}", size), |bencher| {
            bencher.iter(|| ewise::ewise_add(black_box(&a), black_box(&b), &mut out).unwrap())
        });

        group.bench_function(format!("maximum_{}", size), |bencher| {
            bencher.iter(|| ewise::ewise_maximum(black_box(&a), black_box(&b), &mut out).unwrap())
        });

        group.bench_function(format!("tanh_{}", size), |bencher| {
            bencher.iter(|| ewise::ewise_tanh(black_box(&a), &mut out).unwrap())
        });
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    let mut rng = rand::rng();

    let size = 1 << 16;
    let a = random_buffer(&mut rng, size);

    for block in [8, 256, 4096] {
        let mut out = AlignedBuffer::new(size / block).unwrap();

        group.bench_function(format!("sum_block_{}", block), |bencher| {
            bencher.iter(|| reduce::reduce_sum(black_box(&a), &mut out, block).unwrap())
        });

        group.bench_function(format!("max_block_{}", block), |bencher| {
            bencher.iter(|| reduce::reduce_max(black_box(&a), &mut out, block).unwrap())
        });
    }

    group.finish();
}

fn bench_compact(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact");
    let mut rng = rand::rng();

    for size in [64, 256, 1024] {
        let a = random_buffer(&mut rng, size * size);
        let mut out = AlignedBuffer::new(size * size).unwrap();
        let transposed =
            StridedLayout::new(vec![size, size], vec![1, size as isize], 0).unwrap();

        group.bench_function(format!("transpose_{}", size), |bencher| {
            bencher.iter(|| compact::compact(black_box(&a), &mut out, &transposed).unwrap())
        });

        group.bench_function(format!("setitem_transpose_{}", size), |bencher| {
            bencher.iter(|| compact::ewise_setitem(black_box(&a), &mut out, &transposed).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ewise, bench_reduce, bench_compact);
criterion_main!(benches);
