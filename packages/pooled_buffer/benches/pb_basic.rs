//! Basic benchmarks for the `pooled_buffer` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use pooled_buffer::{BucketPool, PooledBuffer};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const SOURCE: [TestItem; 100] = [1024; 100];

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("pb_basic");

    let allocs_op = allocs.operation("with_count_100_warm");
    group.bench_function("with_count_100_warm", |b| {
        b.iter_custom(|iters| {
            let pool = BucketPool::<TestItem>::new();

            // Warm up the bucket so that the measured iterations only reuse.
            drop(PooledBuffer::builder().pool(&pool).with_count(100).unwrap());

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(
                    PooledBuffer::builder()
                        .pool(&pool)
                        .with_count(black_box(100))
                        .unwrap(),
                ));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("copy_from_slice_100_warm");
    group.bench_function("copy_from_slice_100_warm", |b| {
        b.iter_custom(|iters| {
            let pool = BucketPool::<TestItem>::new();

            drop(PooledBuffer::builder().pool(&pool).copy_from_slice(&SOURCE));

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(
                    PooledBuffer::builder()
                        .pool(&pool)
                        .copy_from_slice(black_box(&SOURCE)),
                ));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("vec_from_slice_100");
    group.bench_function("vec_from_slice_100", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(black_box(&SOURCE).to_vec()));
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("pb_growth");

    let allocs_op = allocs.operation("collect_1000_from_4");
    group.bench_function("collect_1000_from_4", |b| {
        b.iter_custom(|iters| {
            let pool = BucketPool::<TestItem>::new();

            // Growing from 4 to 1024 visits every bucket on the way, so warm all of them.
            drop(
                PooledBuffer::builder()
                    .pool(&pool)
                    .collect_from(0..1000)
                    .unwrap(),
            );

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(
                    PooledBuffer::builder()
                        .pool(&pool)
                        .collect_from(black_box(0..1000))
                        .unwrap(),
                ));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("collect_exact_1000");
    group.bench_function("collect_exact_1000", |b| {
        b.iter_custom(|iters| {
            let pool = BucketPool::<TestItem>::new();

            drop(
                PooledBuffer::builder()
                    .pool(&pool)
                    .collect_exact(0..1000)
                    .unwrap(),
            );

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(
                    PooledBuffer::builder()
                        .pool(&pool)
                        .collect_exact(black_box(0..1000))
                        .unwrap(),
                ));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
