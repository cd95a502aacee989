//! Benchmarks for the cipher core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ruc_core::prelude::*;

fn expansion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("key-expansion");
    group.sample_size(10);

    group.bench_function("relaxed", |b| {
        b.iter(|| {
            expand_key_with(
                black_box(&[0x42u8; 64]),
                &SboxCriteria::RELAXED,
                SBOX_RETRY_LIMIT,
            )
        })
    });

    group.finish();
}

fn block_benchmark(c: &mut Criterion) {
    let material =
        expand_key_with(&[0x42u8; 64], &SboxCriteria::RELAXED, SBOX_RETRY_LIMIT).unwrap();
    let initial = material.mix_iv(&[7u8; 32]).unwrap();
    let plaintext = [0xA5u8; BLOCK_BYTES];

    let mut group = c.benchmark_group("block");
    group.throughput(Throughput::Bytes(BLOCK_BYTES as u64));
    group.bench_function("encrypt", |b| {
        b.iter(|| {
            let mut state = initial.clone();
            encrypt_block(black_box(&plaintext), 0, &mut state, &material)
        })
    });
    group.finish();
}

fn mode_benchmark(c: &mut Criterion) {
    let material =
        expand_key_with(&[0x42u8; 64], &SboxCriteria::RELAXED, SBOX_RETRY_LIMIT).unwrap();
    let aead =
        RucAead::new_with(&[0x42u8; 64], &SboxCriteria::RELAXED, SBOX_RETRY_LIMIT).unwrap();
    let nonce = [1u8; NONCE_BYTES];

    let mut group = c.benchmark_group("modes");
    for size in [32usize, 256, 1024, 4096] {
        let plaintext = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("ctr-encrypt", size), &size, |b, _| {
            b.iter(|| ctr::encrypt(&material, black_box(&nonce), black_box(&plaintext)))
        });
        group.bench_with_input(BenchmarkId::new("aead-seal", size), &size, |b, _| {
            b.iter(|| aead.seal(black_box(&nonce), b"aad", black_box(&plaintext)))
        });
    }
    group.finish();
}

criterion_group!(benches, expansion_benchmark, block_benchmark, mode_benchmark);
criterion_main!(benches);
