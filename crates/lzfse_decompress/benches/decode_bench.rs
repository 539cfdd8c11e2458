use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Log-like text: a few templates with varying numbers.
fn text(len: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;

        let line = match state % 4 {
            0 => format!("GET /index.html 200 {}\n", state % 10_000),
            1 => format!("POST /api/v1/items/{} 201 {}\n", state % 997, state % 512),
            2 => format!("GET /static/app.{:x}.js 304 0\n", state % 65_536),
            _ => format!("DELETE /api/v1/items/{} 404 {}\n", state % 31, state % 7),
        };
        out.extend_from_slice(line.as_bytes());
    }

    out.truncate(len);
    out
}

fn noise(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

fn bench_generated(c: &mut Criterion) {
    let mut group = c.benchmark_group("Generated");
    group.measurement_time(Duration::from_secs(7));

    let inputs = [
        ("text_4k", text(4 * 1024)),
        ("text_1m", text(1024 * 1024)),
        ("text_16m", text(16 * 1024 * 1024)),
        ("noise_1m", noise(1024 * 1024)),
    ];

    for (name, expected) in &inputs {
        let mut compressed = Vec::new();
        lzfse_rust::encode_bytes(expected, &mut compressed).unwrap();
        let input = (compressed.as_slice(), expected.as_slice());

        group.throughput(Throughput::Bytes(expected.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("lzfse_decompress", name),
            &input,
            |b, &(compressed, expected)| {
                b.iter(|| {
                    let mut output_buffer = Vec::with_capacity(expected.len());
                    let mut decoder =
                        lzfse_decompress::Decoder::new(black_box(compressed));
                    decoder.decode(&mut output_buffer).unwrap();
                    assert_eq!(output_buffer, expected);
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("lzfse_rust", name),
            &input,
            |b, &(compressed, expected)| {
                b.iter(|| {
                    let mut output_buffer = Vec::with_capacity(expected.len());
                    lzfse_rust::decode_bytes(black_box(compressed), &mut output_buffer)
                        .unwrap();
                    assert_eq!(output_buffer, expected);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_generated);
criterion_main!(benches);
