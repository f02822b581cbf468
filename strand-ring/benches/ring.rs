//! Benchmarks for ring buffer push/pop.
//!
//! Run with: cargo bench -p strand-ring

use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strand_ring::RingBuffer;

const SLOTS: usize = 1024;
const MESSAGE_COUNT: u64 = 100_000;

// ============================================================================
// Single-threaded latency (uncontended lock)
// ============================================================================

fn bench_single_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread");

    for entry_size in [8usize, 64, 256] {
        let ring = RingBuffer::new(entry_size, SLOTS).unwrap();
        let src = vec![0xabu8; entry_size];
        let mut dst = vec![0u8; entry_size];

        group.bench_with_input(BenchmarkId::new("try_push_pop", entry_size), &entry_size, |b, _| {
            b.iter(|| {
                ring.try_push(black_box(&src)).unwrap();
                ring.try_pop(black_box(&mut dst)).unwrap();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Burst: fill then drain
// ============================================================================

fn bench_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("burst");

    for batch in [16usize, 256, SLOTS - 1] {
        group.throughput(Throughput::Elements(batch as u64));
        let ring = RingBuffer::new(8, SLOTS).unwrap();
        let mut dst = [0u8; 8];

        group.bench_with_input(BenchmarkId::new("fill_drain", batch), &batch, |b, &batch| {
            b.iter(|| {
                for i in 0..batch as u64 {
                    ring.try_push(&i.to_le_bytes()).unwrap();
                }
                for _ in 0..batch {
                    ring.try_pop(&mut dst).unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Cross-thread throughput (blocking push/pop)
// ============================================================================

fn bench_cross_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_thread");
    group.throughput(Throughput::Elements(MESSAGE_COUNT));
    group.sample_size(20);

    for slots in [4usize, 64, SLOTS] {
        group.bench_with_input(BenchmarkId::new("spsc", slots), &slots, |b, &slots| {
            b.iter(|| {
                let ring = RingBuffer::new(8, slots).unwrap();
                thread::scope(|s| {
                    s.spawn(|| {
                        for i in 0..MESSAGE_COUNT {
                            ring.push(&i.to_le_bytes()).unwrap();
                        }
                    });

                    let mut dst = [0u8; 8];
                    for _ in 0..MESSAGE_COUNT {
                        ring.pop(&mut dst).unwrap();
                    }
                    black_box(dst);
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_thread, bench_burst, bench_cross_thread);
criterion_main!(benches);
