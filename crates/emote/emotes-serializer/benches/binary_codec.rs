//! Benchmarks for the `.emotecraft` codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use emotes_serializer::{read_data, write_data, EmoteFormat};
use emotes_test_fixtures::emotes;

fn bench_binary_codec(c: &mut Criterion) {
    let json = emotes::json("backflip").expect("fixture");
    let emote = read_data(json.as_bytes(), None, Some("json"))
        .expect("fixture parses")
        .remove(0);

    let mut encoded = Vec::new();
    write_data(&mut encoded, &emote, EmoteFormat::Binary).expect("encode");

    let mut group = c.benchmark_group("binary_codec");
    group.bench_function("write", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            write_data(&mut out, black_box(&emote), EmoteFormat::Binary).unwrap();
            out
        });
    });
    group.bench_function("read", |b| {
        b.iter(|| read_data(black_box(&encoded), None, Some("emotecraft")).unwrap());
    });
    group.bench_function("json_read", |b| {
        b.iter(|| read_data(black_box(json.as_bytes()), None, Some("json")).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_binary_codec);
criterion_main!(benches);
