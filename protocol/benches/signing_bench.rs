// Primitive benchmarks: Ed25519 signing and verification, BLAKE3
// domain-separated hashing, and decimal amount parsing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use levy_protocol::config::FORWARD_REQUEST_CONTEXT;
use levy_protocol::crypto::{domain_separated_hash, LevyKeypair};
use levy_protocol::Amount;

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(LevyKeypair::generate);
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let keypair = LevyKeypair::generate();
    let message = [0x5au8; 32];

    c.bench_function("ed25519/sign_digest", |b| {
        b.iter(|| keypair.sign(&message));
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let keypair = LevyKeypair::generate();
    let message = [0x5au8; 32];
    let signature = keypair.sign(&message);
    let public_key = keypair.public_key();

    c.bench_function("ed25519/verify_strict", |b| {
        b.iter(|| public_key.verify(&message, &signature));
    });
}

fn bench_request_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("blake3/request_digest");

    for size in [128usize, 1024, 16 * 1024] {
        let payload = vec![0xa5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| domain_separated_hash(FORWARD_REQUEST_CONTEXT, payload));
        });
    }

    group.finish();
}

fn bench_parse_amount(c: &mut Criterion) {
    c.bench_function("amount/parse_decimal", |b| {
        b.iter(|| Amount::parse_decimal("123456789.000000000000000045").unwrap());
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_message,
    bench_verify_signature,
    bench_request_digest,
    bench_parse_amount,
);
criterion_main!(benches);
