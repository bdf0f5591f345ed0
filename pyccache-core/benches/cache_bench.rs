//! Benchmarks for the bytecode cache hot path.
//!
//! Measures the operations a code-loading pipeline issues at startup:
//! writes across payload sizes, reads on hit and miss, and mixed traffic
//! over a warm statement cache.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pyccache_core::Cache;
use tempfile::TempDir;

fn bench_set_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_throughput");

    for size in [256_usize, 4_096, 65_536] {
        let payload = vec![0xA5_u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            let dir = TempDir::new().expect("tempdir");
            let mut cache = Cache::open(dir.path().join("bench.db")).expect("open cache");
            let mut round = 0_u64;
            b.iter(|| {
                round += 1;
                let key = format!("mod_{}.py", round % 512);
                cache.set(&key, black_box(payload)).expect("set");
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let dir = TempDir::new().expect("tempdir");
    let mut cache = Cache::open(dir.path().join("bench.db")).expect("open cache");
    let payload = vec![0x5A_u8; 8_192];
    for module in 0..512 {
        cache
            .set(&format!("mod_{module}.py"), &payload)
            .expect("seed");
    }

    c.bench_function("get_hit", |b| {
        let mut round = 0_u64;
        b.iter(|| {
            round += 1;
            let key = format!("mod_{}.py", round % 512);
            black_box(cache.get(&key).expect("get"));
        });
    });

    c.bench_function("get_miss", |b| {
        b.iter(|| black_box(cache.get("absent.py").expect("get")));
    });
}

fn bench_interleaved(c: &mut Criterion) {
    let dir = TempDir::new().expect("tempdir");
    let mut cache = Cache::open(dir.path().join("bench.db")).expect("open cache");
    let payload = vec![0x3C_u8; 4_096];

    c.bench_function("interleaved_get_set", |b| {
        let mut round = 0_u64;
        b.iter(|| {
            round += 1;
            let key = format!("mod_{}.py", round % 64);
            cache.set(&key, black_box(&payload)).expect("set");
            black_box(cache.get(&key).expect("get"));
        });
    });
}

criterion_group!(benches, bench_set_throughput, bench_get, bench_interleaved);
criterion_main!(benches);
