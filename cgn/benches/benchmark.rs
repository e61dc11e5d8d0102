use cgn::{decode_from_document, encode_to_document, EncodeOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_encode(c: &mut Criterion) {
    let payload = vec![0xABu8; 4096];
    c.bench_function("encode_to_document 4KiB", |b| {
        b.iter(|| encode_to_document(black_box(&payload), &EncodeOptions::default()).unwrap())
    });
}

fn bench_decode(c: &mut Criterion) {
    let payload = vec![0xABu8; 4096];
    let document = encode_to_document(&payload, &EncodeOptions::default()).unwrap();
    c.bench_function("decode_from_document 4KiB", |b| {
        b.iter(|| decode_from_document(black_box(&document)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
