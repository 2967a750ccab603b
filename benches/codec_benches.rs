//! Codec microbenchmarks.
//!
//! Covers the per-poll hot path: decoding a status assembly, classifying it
//! and encoding a command request.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyence_vision::{check, CommandRequest, InspectionReport, StatusSnapshot, STATUS_ASSEMBLY_SIZE};

fn sample_status() -> Vec<u8> {
    let mut raw = vec![0u8; STATUS_ASSEMBLY_SIZE];
    raw[0] = 0b0000_0001;
    raw[2] = 0b0011_0011;
    raw[4] = 0b0000_0001;
    raw[6] = 0b1010_1010;
    raw[16] = 3;
    raw[18] = 3;
    raw[22] = 42;
    for (i, byte) in raw.iter_mut().enumerate().skip(72) {
        *byte = (i % 251) as u8;
    }
    raw
}

fn bench_decode(c: &mut Criterion) {
    let raw = sample_status();
    c.bench_function("status_decode", |b| {
        b.iter(|| StatusSnapshot::from_bytes(black_box(&raw)))
    });

    let status = StatusSnapshot::from_bytes(&raw).unwrap_or_default();
    c.bench_function("status_check", |b| b.iter(|| check(black_box(&status))));
    c.bench_function("status_flag_summary", |b| {
        b.iter(|| black_box(&status).flag_summary())
    });
}

fn bench_encode(c: &mut Criterion) {
    let request = CommandRequest::switch_program(17).unwrap_or_default();
    c.bench_function("command_encode", |b| {
        b.iter(|| black_box(&request).to_bytes())
    });

    let status = StatusSnapshot::from_bytes(&sample_status()).unwrap_or_default();
    c.bench_function("report_json_16_tools", |b| {
        b.iter(|| InspectionReport::from_status(black_box(&status), 16).to_json())
    });
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
