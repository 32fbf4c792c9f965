use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rsdev::reed_solomon::{RsCodec, RsParameters};
use rsdev::service::RsService;
use std::hint::black_box;

fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + 7) as u8).collect()
}

/// Parity generation for growing data blocks
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("rs_encode");
    let codec = RsCodec::new(RsParameters::default()).unwrap();

    for len in [29usize, 64, 128, 223] {
        let data = sample_data(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            let mut parity = vec![0u16; codec.nroots()];
            b.iter(|| {
                parity.fill(0);
                codec.encode(black_box(data), &mut parity).unwrap();
            });
        });
    }

    group.finish();
}

/// Correction cost as the number of symbol errors grows
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("rs_decode");
    let codec = RsCodec::new(RsParameters::default()).unwrap();
    let data = sample_data(223);
    let mut parity = vec![0u16; codec.nroots()];
    codec.encode(&data, &mut parity).unwrap();

    for errors in [0usize, 1, 8, 16] {
        let mut corrupted = data.clone();
        for i in 0..errors {
            corrupted[i * 13] ^= 0x5A;
        }

        group.bench_with_input(BenchmarkId::from_parameter(errors), &errors, |b, _| {
            b.iter(|| {
                let mut d = corrupted.clone();
                let mut p = parity.clone();
                black_box(codec.decode(&mut d, &mut p).unwrap())
            });
        });
    }

    group.finish();
}

/// Full endpoint round trip including the session lock and copies
fn bench_service_round_trip(c: &mut Criterion) {
    let service = RsService::default();
    service.set_parameters(RsParameters::default()).unwrap();
    let data = b"TEsting data for rs enodding\0";

    c.bench_function("service_round_trip", |b| {
        let mut encoder = service.open_encoder();
        let mut decoder = service.open_decoder();
        b.iter(|| {
            encoder.write_bytes(black_box(data)).unwrap();
            let block = encoder.read_to_end().unwrap();
            decoder.write_bytes(&block).unwrap();
            black_box(decoder.read_to_end().unwrap())
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_service_round_trip);
criterion_main!(benches);
