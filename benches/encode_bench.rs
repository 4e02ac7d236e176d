use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use mirbench::encoding::{encode, encode_pair, BindingMatrixEncoder, EncodeOptions};
use mirbench::record::{SequencePairRecord, DEFAULT_GENE_COLUMN, DEFAULT_MIRNA_COLUMN};

fn random_seq(rng: &mut SmallRng, len: usize, alphabet: &[u8]) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Benchmark-sized records: 50-nt target sites and 22-nt miRNAs.
fn records(n: usize) -> Vec<SequencePairRecord> {
    let mut rng = SmallRng::seed_from_u64(2024);
    (0..n)
        .map(|_| {
            let gene = random_seq(&mut rng, 50, b"ACGT");
            let mirna = random_seq(&mut rng, 22, b"ACGU");
            SequencePairRecord::pair(&gene, &mirna)
        })
        .collect()
}

fn bench_encode_pair(c: &mut Criterion) {
    c.bench_function("encode_single_pair", |b| {
        b.iter(|| {
            encode_pair(
                black_box("ACGTACGTAAGCTGCTAACCGTATTTACGGCATCCAACGTACGTAAGCTG"),
                black_box("UAGCAGCACGUAAAUAUUGGCG"),
            )
        })
    });
}

fn bench_encode_batch(c: &mut Criterion) {
    let batch = records(1000);
    c.bench_function("encode_1000_records", |b| {
        b.iter(|| encode(black_box(&batch), DEFAULT_GENE_COLUMN, DEFAULT_MIRNA_COLUMN))
    });
}

fn bench_encode_batch_single_thread(c: &mut Criterion) {
    let batch = records(1000);
    let encoder = BindingMatrixEncoder::new(&EncodeOptions { threads: 1 }).unwrap();
    c.bench_function("encode_1000_records_1_thread", |b| {
        b.iter(|| encoder.encode(black_box(&batch), DEFAULT_GENE_COLUMN, DEFAULT_MIRNA_COLUMN))
    });
}

criterion_group!(
    benches,
    bench_encode_pair,
    bench_encode_batch,
    bench_encode_batch_single_thread
);
criterion_main!(benches);
