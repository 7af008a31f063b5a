// Signing, authorization and encoding benchmarks.
//
// Covers keypair generation, envelope signing, the authorization check over
// a multi-signed envelope, and envelope encode/decode at several sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ledgerline_protocol::account::AccountState;
use ledgerline_protocol::asset::Asset;
use ledgerline_protocol::codec::{Decode, Encode};
use ledgerline_protocol::config::NetworkConfig;
use ledgerline_protocol::crypto::KeyPair;
use ledgerline_protocol::operation::OperationBuilder;
use ledgerline_protocol::transaction::{
    authorization_status, SignatureCollector, TransactionAssembler, TransactionEnvelope,
};

fn payments(source: &KeyPair, count: usize) -> TransactionEnvelope {
    let dest = KeyPair::from_seed_bytes(&[2u8; 32]).address();
    TransactionAssembler::new(&AccountState::new(source.address(), 42))
        .add_operations(
            (0..count).map(|_| OperationBuilder::payment(dest, Asset::Native, "1.5").unwrap()),
        )
        .unwrap()
        .unbounded()
        .seal()
        .unwrap()
}

fn bench_keypair_generation(c: &mut Criterion) {
    c.bench_function("ed25519/keypair_generate", |b| {
        b.iter(KeyPair::generate);
    });
}

fn bench_sign_envelope(c: &mut Criterion) {
    let keypair = KeyPair::generate();
    let network = NetworkConfig::testnet();
    let envelope = payments(&keypair, 1);

    c.bench_function("envelope/sign", |b| {
        b.iter(|| {
            SignatureCollector::new(envelope.clone(), &network)
                .sign(&keypair)
                .unwrap()
        });
    });
}

fn bench_authorization_status(c: &mut Criterion) {
    let network = NetworkConfig::testnet();
    let source = KeyPair::generate();
    let op_sources: Vec<KeyPair> = (0..10).map(|_| KeyPair::generate()).collect();
    let dest = KeyPair::generate().address();

    let envelope = TransactionAssembler::new(&AccountState::new(source.address(), 1))
        .add_operations(op_sources.iter().map(|kp| {
            OperationBuilder::payment(dest, Asset::Native, "1")
                .unwrap()
                .with_source(kp.address())
        }))
        .unwrap()
        .seal()
        .unwrap();
    let signed = SignatureCollector::new(envelope, &network)
        .sign(&source)
        .unwrap()
        .sign_all(&op_sources)
        .unwrap()
        .finish();

    c.bench_function("envelope/authorization_status_11_signers", |b| {
        b.iter(|| authorization_status(&signed, &network, &[]));
    });
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope/codec");
    let keypair = KeyPair::generate();

    for ops in [1, 10, 100] {
        let envelope = payments(&keypair, ops);
        let bytes = envelope.to_xdr();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", ops), &envelope, |b, env| {
            b.iter(|| env.to_xdr());
        });
        group.bench_with_input(BenchmarkId::new("decode", ops), &bytes, |b, bytes| {
            b.iter(|| TransactionEnvelope::from_xdr(bytes).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_envelope,
    bench_authorization_status,
    bench_codec,
);
criterion_main!(benches);
