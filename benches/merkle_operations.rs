use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use griffion_consensus::crypto::{hash256, Hash256Writer};
use griffion_consensus::merkle::{compute_merkle_root, merkle_branch, merkle_root_from_branch};
use griffion_consensus::types::Hash;

fn leaves(count: usize) -> Vec<Hash> {
    (0..count)
        .map(|i| hash256(&(i as u64).to_le_bytes()))
        .collect()
}

fn benchmark_double_sha256(c: &mut Criterion) {
    let data_64b = vec![0u8; 64];
    let data_1kb = vec![0u8; 1024];

    c.bench_function("hash256_64b", |b| {
        b.iter(|| black_box(hash256(black_box(&data_64b))))
    });

    c.bench_function("hash256_1kb", |b| {
        b.iter(|| black_box(hash256(black_box(&data_1kb))))
    });

    // Streaming in 32-byte pieces, as the merkle pair hash does
    c.bench_function("hash256_writer_1kb", |b| {
        b.iter(|| {
            let mut writer = Hash256Writer::new();
            for chunk in black_box(&data_1kb).chunks(32) {
                writer = writer.write(chunk);
            }
            black_box(writer.finalize())
        })
    });
}

fn benchmark_merkle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_root");
    for count in [1usize, 16, 255, 2_000, 10_000] {
        let ids = leaves(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &ids, |b, ids| {
            b.iter(|| black_box(compute_merkle_root(black_box(ids.clone()))))
        });
    }
    group.finish();
}

fn benchmark_merkle_branch(c: &mut Criterion) {
    let ids = leaves(2_000);
    let branch = merkle_branch(&ids, 1_337);

    c.bench_function("merkle_branch_2000", |b| {
        b.iter(|| black_box(merkle_branch(black_box(&ids), 1_337)))
    });

    c.bench_function("merkle_root_from_branch_2000", |b| {
        b.iter(|| black_box(merkle_root_from_branch(ids[1_337], black_box(&branch), 1_337)))
    });
}

criterion_group!(
    benches,
    benchmark_double_sha256,
    benchmark_merkle_root,
    benchmark_merkle_branch
);
criterion_main!(benches);
