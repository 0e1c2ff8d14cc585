//! Throughput of the two hot paths every signal crosses: writing TLVs out
//! and parsing them back in. Mirrors the teacher's `error_performance.rs`
//! shape (a happy-path group plus an error-path group, `black_box`-guarded).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dlep_codec::{SignalParser, TlvConstraint, Writer};
use dlep_types::signal::SignalType;
use dlep_types::tlv::TlvType;

fn build_peer_init_payload() -> Vec<u8> {
    let mut buf = Vec::new();
    let mut writer = Writer::new(&mut buf);
    writer.begin_signal(SignalType::PEER_INITIALIZATION).unwrap();
    writer.add_tlv(TlvType::HEARTBEAT_INTERVAL, &1000u16.to_be_bytes()).unwrap();
    writer.add_tlv(TlvType::PEER_TYPE, b"bench-radio").unwrap();
    writer
        .add_tlv(TlvType::EXTENSIONS_SUPPORTED, &[0, 0, 0, 1])
        .unwrap();
    writer.finish_signal().unwrap();
    let (_, payload, _) = dlep_codec::unframe_signal(&buf).unwrap();
    payload.to_vec()
}

fn parser_for_peer_init() -> SignalParser {
    let mut parser = SignalParser::new();
    parser.allow(TlvType::HEARTBEAT_INTERVAL, TlvConstraint::fixed(2, true));
    parser.allow(TlvType::PEER_TYPE, TlvConstraint::range(0, 80, false));
    parser.allow(
        TlvType::EXTENSIONS_SUPPORTED,
        TlvConstraint::range(0, u16::MAX as usize, false),
    );
    parser
}

fn bench_writer(c: &mut Criterion) {
    c.bench_function("writer_builds_peer_init", |b| {
        b.iter(|| black_box(build_peer_init_payload()));
    });
}

fn bench_parser_happy_path(c: &mut Criterion) {
    let payload = build_peer_init_payload();
    let mut parser = parser_for_peer_init();
    c.bench_function("parser_parses_peer_init", |b| {
        b.iter(|| {
            parser.parse(black_box(&payload)).unwrap();
        });
    });
}

fn bench_parser_rejection_path(c: &mut Criterion) {
    let mut malformed = Vec::new();
    dlep_codec::write_tlv(&mut malformed, TlvType::STATUS, &[0]).unwrap();
    let mut parser = parser_for_peer_init();
    c.bench_function("parser_rejects_unsupported_tlv", |b| {
        b.iter(|| {
            let _ = parser.parse(black_box(&malformed));
        });
    });
}

criterion_group!(benches, bench_writer, bench_parser_happy_path, bench_parser_rejection_path);
criterion_main!(benches);
