//! # Secure Channel Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | envelope | seal and open of one request at several payload sizes |
//! | framing | finding the message boundary in a buffer of queued envelopes |
//! | handshake | full M1/M2/M3 exchange over an in-memory pipe |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_crypto::SecretKey;
use shared_types::AccountRequest;
use st_01_secure_channel::transport::envelope_frame;
use st_01_secure_channel::{
    InMemoryKeyStore, MasterSecret, SecureChannel, SecureStream, SessionKeys, SessionLimits,
};
use std::time::Duration;
use tokio::io::{duplex, split};

fn channel() -> SecureChannel {
    let ms = MasterSecret::from_slice(&[7u8; 32]).unwrap();
    SecureChannel::new(SessionKeys::derive(&ms).unwrap())
}

fn request_with_padding(size: usize) -> AccountRequest {
    AccountRequest {
        action: "x".repeat(size),
        amount: Some(100),
    }
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let ch = channel();

    for size in [16, 256, 4096] {
        let request = request_with_padding(size);
        let sealed = ch.seal(&request).unwrap();
        group.throughput(Throughput::Bytes(sealed.len() as u64));

        group.bench_with_input(BenchmarkId::new("seal", size), &request, |b, req| {
            b.iter(|| black_box(ch.seal(req).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("open", size), &sealed, |b, bytes| {
            b.iter(|| black_box(ch.open::<AccountRequest>(bytes).unwrap()))
        });
    }

    group.finish();
}

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    let ch = channel();

    for queued in [1, 8, 32] {
        let buffer: Vec<u8> = (0..queued)
            .flat_map(|i| ch.seal(&AccountRequest::deposit(i)).unwrap())
            .collect();
        group.bench_with_input(BenchmarkId::new("first_boundary", queued), &buffer, |b, buf| {
            let check = envelope_frame(&ch);
            b.iter(|| black_box(check(buf)))
        });
    }

    group.finish();
}

fn bench_handshake(c: &mut Criterion) {
    let mut group = c.benchmark_group("handshake");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let psk = SecretKey::generate();
    let store = InMemoryKeyStore::new().with_key("alice", &psk);
    let limits = SessionLimits::default();
    let alice: shared_types::Identity = "alice".parse().unwrap();

    group.bench_function("duplex_roundtrip", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let (server_io, client_io) = duplex(4096);
                let (sr, sw) = split(server_io);
                let (cr, cw) = split(client_io);
                let (server, client) = tokio::join!(
                    SecureStream::accept(sr, sw, &store, &limits),
                    SecureStream::connect(cr, cw, alice.clone(), psk.clone(), &limits),
                );
                black_box(server.is_ok() && client.is_ok())
            })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_envelope, bench_framing, bench_handshake);
criterion_main!(benches);
