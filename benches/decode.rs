//! Throughput benchmark for [`unlzma2::decode`]/[`unlzma2::xz::decode`].
//! Grounded on the teacher's `benches/lzma2.rs` (criterion, `black_box`,
//! one `BenchmarkId` per preset), narrowed to the decode direction only —
//! this crate has no encoder to benchmark the other side of.

use std::hint::black_box;
use std::io::Read;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liblzma::stream::{Check, Filters, LzmaOptions, Stream};

fn highly_repetitive(len: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

fn encode_raw_lzma2(data: &[u8], preset: u32) -> Vec<u8> {
    let opts = LzmaOptions::new_preset(preset).unwrap();
    let mut filters = Filters::new();
    filters.lzma2(&opts);
    let stream = Stream::new_raw_encoder(&filters).unwrap();
    let mut encoder = liblzma::read::XzEncoder::new_stream(data, stream);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).unwrap();
    compressed
}

fn encode_xz(data: &[u8], preset: u32) -> Vec<u8> {
    let stream = Stream::new_easy_encoder(preset, Check::Crc32).unwrap();
    let mut encoder = liblzma::read::XzEncoder::new_stream(data, stream);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).unwrap();
    compressed
}

fn bench_raw_decode(c: &mut Criterion) {
    let data = highly_repetitive(1 << 20);
    let mut group = c.benchmark_group("lzma2_decode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for preset in [0u32, 6, 9] {
        let compressed = encode_raw_lzma2(&data, preset);
        let mut out = vec![0u8; data.len()];
        group.bench_with_input(BenchmarkId::new("raw", preset), &compressed, |b, compressed| {
            b.iter(|| {
                let outcome = unlzma2::decode(black_box(compressed), black_box(&mut out));
                black_box(outcome.produced_out)
            });
        });
    }
    group.finish();
}

fn bench_xz_decode(c: &mut Criterion) {
    let data = highly_repetitive(1 << 20);
    let mut group = c.benchmark_group("xz_decode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for preset in [0u32, 6, 9] {
        let compressed = encode_xz(&data, preset);
        let mut out = vec![0u8; data.len()];
        group.bench_with_input(BenchmarkId::new("xz", preset), &compressed, |b, compressed| {
            b.iter(|| {
                let outcome = unlzma2::xz::decode(black_box(compressed), black_box(&mut out));
                black_box(outcome.produced_out)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_raw_decode, bench_xz_decode);
criterion_main!(benches);
