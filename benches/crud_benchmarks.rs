use alva_tree::{AvlMap, AvlSet};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::{BTreeMap, BTreeSet};

const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for a deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert_ordered(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_ordered");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter(|| {
            let mut map = AvlMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for i in 0..N as i64 {
                map.insert(i, i);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_reverse");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        let keys = reverse_ordered_keys(N);
        b.iter(|| {
            let mut map = AvlMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        let keys = reverse_ordered_keys(N);
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        let keys = random_keys(N);
        b.iter(|| {
            let mut map = AvlMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        let keys = random_keys(N);
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_get");

    let keys = random_keys(N);

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        let mut map = AvlMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        b.iter(|| {
            let mut hits = 0usize;
            for k in &keys {
                if map.get(k).is_some() {
                    hits += 1;
                }
            }
            hits
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        let mut map = BTreeMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        b.iter(|| {
            let mut hits = 0usize;
            for k in &keys {
                if map.get(k).is_some() {
                    hits += 1;
                }
            }
            hits
        });
    });

    group.finish();
}

fn bench_map_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_remove");

    let keys = random_keys(N);

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        b.iter_batched(
            || {
                let mut map = AvlMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            },
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || {
                let mut map = BTreeMap::new();
                for &k in &keys {
                    map.insert(k, k);
                }
                map
            },
            |mut map| {
                for k in &keys {
                    map.remove(k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_map_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_iterate");

    let keys = random_keys(N);

    group.bench_function(BenchmarkId::new("AvlMap", N), |b| {
        let mut map = AvlMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        b.iter(|| map.iter().map(|(_, v)| *v).sum::<i64>());
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        let mut map = BTreeMap::new();
        for &k in &keys {
            map.insert(k, k);
        }
        b.iter(|| map.iter().map(|(_, v)| *v).sum::<i64>());
    });

    group.finish();
}

// ─── Set Benchmarks ─────────────────────────────────────────────────────────

fn bench_set_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_insert_random");

    group.bench_function(BenchmarkId::new("AvlSet", N), |b| {
        let keys = random_keys(N);
        b.iter(|| {
            let mut set = AvlSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        let keys = random_keys(N);
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_set_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_contains");

    let keys = random_keys(N);
    let probes = ordered_keys(N);

    group.bench_function(BenchmarkId::new("AvlSet", N), |b| {
        let set: AvlSet<i64> = keys.iter().copied().collect();
        b.iter(|| probes.iter().filter(|k| set.contains(k)).count());
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        let set: BTreeSet<i64> = keys.iter().copied().collect();
        b.iter(|| probes.iter().filter(|k| set.contains(k)).count());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_map_insert_ordered,
    bench_map_insert_reverse,
    bench_map_insert_random,
    bench_map_get,
    bench_map_remove,
    bench_map_iterate,
    bench_set_insert_random,
    bench_set_contains,
);
criterion_main!(benches);
