//! CRC-32 throughput benchmarks.
//!
//! Measures the single-table path (inputs under 16 bytes) against the
//! slicing-by-8 path, across sizes and data patterns, plus the cost of
//! feeding the same data incrementally.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use memzip_core::crc::Crc32;
use std::hint::black_box;

type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// LCG output, reproducible across runs.
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

const SIZES: [(&str, usize); 5] = [
    ("8B", 8),
    ("16B", 16),
    ("4KB", 4 * 1024),
    ("64KB", 64 * 1024),
    ("1MB", 1024 * 1024),
];

fn bench_crc32_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_sizes");

    for (size_name, size) in SIZES {
        let data = test_data::text_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        });
    }

    group.finish();
}

fn bench_crc32_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_patterns");

    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("text", test_data::text_like),
    ];

    let size = 64 * 1024;
    for (pattern_name, generator) in patterns {
        let data = generator(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern_name),
            &data,
            |b, data| {
                b.iter(|| black_box(Crc32::compute(black_box(data))));
            },
        );
    }

    group.finish();
}

fn bench_crc32_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_incremental");
    let data = test_data::random(64 * 1024);

    for chunk in [7usize, 64, 4096] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &data, |b, data| {
            b.iter(|| {
                let mut crc = Crc32::new();
                for piece in data.chunks(chunk) {
                    crc.update(black_box(piece));
                }
                black_box(crc.finalize())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_crc32_sizes,
    bench_crc32_patterns,
    bench_crc32_incremental,
);
criterion_main!(benches);
