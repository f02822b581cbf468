//! Benchmarks for intrusive list relinking.
//!
//! Run with: cargo bench -p strand-list
//!
//! Storage is pre-filled once; every iteration only relinks.

use std::collections::VecDeque;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strand_list::{Link, List, Slots, link_adapter};

const LEN: usize = 10_000;

struct Node {
    value: u64,
    link: Link<u32>,
}

link_adapter!(NodeLink = Node { link: Link<u32> });

fn filled(len: usize) -> (Slots<Node>, List<NodeLink>, Vec<u32>) {
    let mut slots = Slots::with_capacity(len);
    let mut list = List::new();
    let keys = (0..len as u64)
        .map(|value| {
            let idx = slots.insert(Node {
                value,
                link: Link::new(),
            });
            list.insert_tail(&mut slots, idx);
            idx
        })
        .collect();
    (slots, list, keys)
}

// ============================================================================
// Head/tail churn (queue usage)
// ============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.throughput(Throughput::Elements(LEN as u64));

    let (mut slots, mut list, _) = filled(LEN);
    group.bench_function("strand_list", |b| {
        b.iter(|| {
            for _ in 0..LEN {
                let idx = list.delete_head(&mut slots).unwrap();
                list.insert_tail(&mut slots, black_box(idx));
            }
        });
    });

    let mut deque: VecDeque<u64> = (0..LEN as u64).collect();
    group.bench_function("vec_deque", |b| {
        b.iter(|| {
            for _ in 0..LEN {
                let v = deque.pop_front().unwrap();
                deque.push_back(black_box(v));
            }
        });
    });

    group.finish();
}

// ============================================================================
// Delete/reinsert at arbitrary positions
// ============================================================================

fn bench_random_relink(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_relink");

    for len in [100, 1_000, LEN] {
        group.throughput(Throughput::Elements(1_000));

        let (mut slots, mut list, keys) = filled(len);
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let picks: Vec<(u32, u32)> = (0..1_000)
            .map(|_| {
                let a = keys[rng.gen_range(0..len)];
                let b = keys[rng.gen_range(0..len)];
                (a, b)
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("delete_insert_after", len), &picks, |b, picks| {
            b.iter(|| {
                for &(a, at) in picks {
                    if a == at {
                        continue;
                    }
                    list.delete(&mut slots, a);
                    list.insert_after(&mut slots, Some(at), a);
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("swap", len), &picks, |b, picks| {
            b.iter(|| {
                for &(a, other) in picks {
                    list.swap(&mut slots, black_box(a), black_box(other));
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Bulk moves
// ============================================================================

fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk");

    let (mut slots, mut list, _) = filled(LEN);
    let mut other: List<NodeLink> = List::new();

    group.bench_function("move_all", |b| {
        b.iter(|| {
            List::move_all(&mut list, &mut other);
            List::move_all(&mut other, &mut list);
        });
    });

    group.bench_function("iter_sum", |b| {
        b.iter(|| black_box(list.iter(&slots).map(|(_, n)| n.value).sum::<u64>()));
    });

    group.bench_function("clear_refill", |b| {
        b.iter(|| {
            list.clear(&mut slots);
            for idx in 0..LEN as u32 {
                list.insert_tail(&mut slots, idx);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_churn, bench_random_relink, bench_bulk);
criterion_main!(benches);
