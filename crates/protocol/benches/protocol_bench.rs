use bytes::BytesMut;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::io::Cursor;

use ephemera_common::Intent;
use ephemera_protocol::{Command, Frame};

fn bench_encode_create(c: &mut Criterion) {
    let frame = Command::Create(Intent::Employer).to_frame();

    c.bench_function("encode_create", |b| {
        b.iter(|| {
            let mut buf = BytesMut::with_capacity(64);
            black_box(&frame).encode(&mut buf);
            buf
        })
    });
}

fn bench_parse_consume(c: &mut Criterion) {
    let frame = Frame::array_from_strs(&["CONSUME", "q2xXo2i4bqv1T1S3Vg7f0Q"]);
    let mut buf = BytesMut::new();
    frame.encode(&mut buf);
    let encoded = buf.freeze();

    c.bench_function("parse_consume_command", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(encoded.as_ref()));
            Frame::check(&mut cursor).unwrap();
            cursor.set_position(0);
            let frame = Frame::parse(&mut cursor).unwrap();
            Command::from_frame(frame).unwrap()
        })
    });
}

fn bench_parse_null_reply(c: &mut Criterion) {
    let data = b"$-1\r\n";

    c.bench_function("parse_null_reply", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(&data[..]));
            Frame::parse(&mut cursor).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_encode_create,
    bench_parse_consume,
    bench_parse_null_reply,
);
criterion_main!(benches);
