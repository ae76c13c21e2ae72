use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use chained_hashtable::{HashTable, Mode};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn keys(seed: u64, n: usize) -> Vec<[u8; 8]> {
    lcg(seed).take(n).map(u64::to_le_bytes).collect()
}

fn bench_insert_fresh_10k(c: &mut Criterion) {
    let ks = keys(1, 10_000);
    for (name, mode) in [
        ("table::insert_fresh_10k_copy", Mode::CopyBoth),
        ("table::insert_fresh_10k_valueref", Mode::CopyKeyBorrowValue),
        ("table::insert_fresh_10k_borrow", Mode::BorrowBoth),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || HashTable::new(mode),
                |mut t| {
                    for k in &ks {
                        t.insert(k, k).unwrap();
                    }
                    black_box(t)
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_lookup_hit(c: &mut Criterion) {
    let ks = keys(7, 20_000);
    let mut t = HashTable::new(Mode::BorrowBoth);
    for k in &ks {
        t.insert(k, k).unwrap();
    }
    c.bench_function("table::lookup_hit_20k", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let k = &ks[i % ks.len()];
            i = i.wrapping_add(1);
            black_box(t.lookup(k))
        })
    });
}

fn bench_lookup_miss(c: &mut Criterion) {
    let ks = keys(7, 20_000);
    let misses = keys(99, 1_000);
    let mut t = HashTable::new(Mode::BorrowBoth);
    for k in &ks {
        t.insert(k, k).unwrap();
    }
    c.bench_function("table::lookup_miss_20k", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let k = &misses[i % misses.len()];
            i = i.wrapping_add(1);
            black_box(t.has_key(k))
        })
    });
}

fn bench_remove_all_10k(c: &mut Criterion) {
    let ks = keys(5, 10_000);
    c.bench_function("table::remove_all_10k", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::new(Mode::CopyBoth);
                for k in &ks {
                    t.insert(k, k).unwrap();
                }
                t
            },
            |mut t| {
                for k in &ks {
                    t.remove(k).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_resize_10k(c: &mut Criterion) {
    let ks = keys(11, 10_000);
    c.bench_function("table::resize_10k_to_4096", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::new(Mode::BorrowBoth);
                for k in &ks {
                    t.insert(k, k).unwrap();
                }
                t
            },
            |mut t| {
                t.resize(4096).unwrap();
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cursor_10k(c: &mut Criterion) {
    let ks = keys(13, 10_000);
    let mut t = HashTable::new(Mode::BorrowBoth);
    for k in &ks {
        t.insert(k, k).unwrap();
    }
    c.bench_function("table::cursor_walk_10k", |b| {
        b.iter(|| {
            let mut n = 0usize;
            t.iter_reset();
            while let Some(k) = t.iter_next() {
                n += k.len();
            }
            black_box(n)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_fresh_10k, bench_lookup_hit, bench_lookup_miss, bench_remove_all_10k, bench_resize_10k, bench_cursor_10k
}
criterion_main!(benches);
