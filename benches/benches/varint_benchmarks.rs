use std::hint::black_box;

use bitbundle::{BitReader, BitWriter, VarInt};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const N: usize = 10_000;

fn small_values() -> Vec<i32> {
    let mut rng = SmallRng::seed_from_u64(7);
    (0..N).map(|_| rng.gen_range(-64..64)).collect()
}

fn wide_values() -> Vec<i32> {
    let mut rng = SmallRng::seed_from_u64(11);
    (0..N).map(|_| rng.gen()).collect()
}

fn encode(
    values: &[i32],
    coding: VarInt,
) -> Vec<u8> {
    let mut w = BitWriter::new(Vec::with_capacity(values.len() * 4));
    for &v in values {
        w.write_variable_int(v, coding).unwrap();
    }
    w.finish().unwrap()
}

fn bench_write_variable_int(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_variable_int");
    group.throughput(Throughput::Elements(N as u64));
    for (name, values) in [("small", small_values()), ("wide", wide_values())] {
        for coding in [VarInt::signed(3, 0), VarInt::signed(3, 4), VarInt::signed(7, 0)] {
            let id = format!("{name}/step{}+{}", coding.step, coding.increment);
            group.bench_with_input(BenchmarkId::from_parameter(id), &values, |b, values| {
                b.iter(|| black_box(encode(black_box(values), coding)))
            });
        }
    }
    group.finish();
}

fn bench_read_variable_int(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_variable_int");
    group.throughput(Throughput::Elements(N as u64));
    let coding = VarInt::signed(3, 4);
    for (name, values) in [("small", small_values()), ("wide", wide_values())] {
        let bytes = encode(&values, coding);
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| {
                let mut r = BitReader::new(bytes.as_slice());
                for _ in 0..N {
                    black_box(r.read_variable_int(coding).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_write_bits(c: &mut Criterion) {
    c.bench_function("write_bits 5-bit fields", |b| {
        b.iter(|| {
            let mut w = BitWriter::new(Vec::with_capacity(N));
            for i in 0..N as u64 {
                w.write_bits(black_box(i & 0x1F), 5).unwrap();
            }
            black_box(w.finish().unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_write_variable_int,
    bench_read_variable_int,
    bench_write_bits
);
criterion_main!(benches);
