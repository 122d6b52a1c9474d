use std::hint::black_box;

use bitbundle::{marshal, unmarshal, Bundle, Value};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Плоский Bundle с `n` ключами разных видов.
fn flat_bundle(n: usize) -> Bundle {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut b = Bundle::new();
    for i in 0..n {
        let key = format!("field_{i}");
        match i % 4 {
            0 => b.put_int(key, rng.gen()),
            1 => b.put_double(key, rng.gen()),
            2 => b.put_string(key, format!("value-{}", rng.gen::<u32>())),
            _ => b.put_boolean(key, rng.gen()),
        };
    }
    b
}

/// Список записей с одинаковыми ключами: основной случай для словаря.
fn records(n: usize) -> Bundle {
    let rows = (0..n).map(|i| {
        Some(Value::Bundle(
            Bundle::new()
                .with("id", i as i64)
                .with("name", format!("user{i}"))
                .with("active", i % 2 == 0),
        ))
    });
    Bundle::new().with("rows", Value::List(rows.collect()))
}

fn bench_marshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("marshal");
    for n in [10, 100, 1000] {
        let flat = flat_bundle(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("flat", n), &flat, |b, bundle| {
            b.iter(|| black_box(marshal(black_box(bundle)).unwrap()))
        });
        let rows = records(n);
        group.bench_with_input(BenchmarkId::new("records", n), &rows, |b, bundle| {
            b.iter(|| black_box(marshal(black_box(bundle)).unwrap()))
        });
    }
    group.finish();
}

fn bench_unmarshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("unmarshal");
    for n in [10, 100, 1000] {
        let bytes = marshal(&records(n)).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", n), &bytes, |b, bytes| {
            b.iter(|| black_box(unmarshal(black_box(bytes)).unwrap()))
        });
    }
    group.finish();
}

fn bench_byte_array(c: &mut Criterion) {
    let payload = vec![0xA5u8; 64 * 1024];
    let bundle = Bundle::new().with("blob", payload);
    let bytes = marshal(&bundle).unwrap();
    c.bench_function("marshal 64KiB byte array", |b| {
        b.iter(|| black_box(marshal(black_box(&bundle)).unwrap()))
    });
    c.bench_function("unmarshal 64KiB byte array", |b| {
        b.iter(|| black_box(unmarshal(black_box(&bytes)).unwrap()))
    });
}

criterion_group!(benches, bench_marshal, bench_unmarshal, bench_byte_array);
criterion_main!(benches);
