use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

// Import our generation-counted barrier
use cyclic_barrier::CyclicBarrier;

const ROUNDS: usize = 100;

// Benchmark 1: Uncontended single-participant round trip
fn bench_single_participant(c: &mut Criterion) {
    c.bench_function("cyclic_barrier_single_participant", |b| {
        let barrier = CyclicBarrier::new(1);
        b.iter(|| black_box(barrier.arrive_and_wait()));
    });

    c.bench_function("std_barrier_single_participant", |b| {
        let barrier = std::sync::Barrier::new(1);
        b.iter(|| black_box(barrier.wait()));
    });
}

// Benchmark 2: N threads running ROUNDS back-to-back rounds
fn bench_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("rounds");

    for num_threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("cyclic_barrier", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let barrier = Arc::new(CyclicBarrier::new(num_threads));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                for _ in 0..ROUNDS {
                                    barrier.arrive_and_wait();
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("cyclic_barrier_timed", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let barrier = Arc::new(CyclicBarrier::new(num_threads));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                for _ in 0..ROUNDS {
                                    let _ = barrier
                                        .wait_timeout(std::time::Duration::from_secs(10));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("std_barrier", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let barrier = Arc::new(std::sync::Barrier::new(num_threads));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let barrier = Arc::clone(&barrier);
                            thread::spawn(move || {
                                for _ in 0..ROUNDS {
                                    barrier.wait();
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        let _ = handle.join();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_single_participant, bench_rounds);
criterion_main!(benches);
