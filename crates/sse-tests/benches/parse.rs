use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sse_stream::{ChunkSource, SseStream};
use sse_wire::{Parser, ParserConfig};

/// A realistic token-streaming payload: many small `data` events with an
/// occasional comment keep-alive.
fn token_stream(events: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..events {
        if i % 16 == 0 {
            out.extend_from_slice(b": keep-alive\n\n");
        }
        out.extend_from_slice(format!("id: {i}\nevent: delta\n").as_bytes());
        out.extend_from_slice(b"data: {\"type\":\"content_block_delta\",\"text\":\"h\xC3\xA9llo\"}\n\n");
    }
    out
}

fn bench_parse_whole(c: &mut Criterion) {
    let payload = token_stream(1_000);
    let mut group = c.benchmark_group("parse_whole");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("lossy", |b| {
        b.iter(|| Parser::new().feed(&payload).unwrap());
    });
    group.bench_function("strict", |b| {
        b.iter(|| Parser::with_config(ParserConfig::strict()).feed(&payload).unwrap());
    });
    group.finish();
}

fn bench_parse_chunked(c: &mut Criterion) {
    let payload = token_stream(1_000);
    let mut group = c.benchmark_group("parse_chunked");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for size in [1usize, 7, 64, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut parser = Parser::new();
                let mut count = 0;
                for chunk in payload.chunks(size) {
                    count += parser.feed(chunk).unwrap().len();
                }
                count
            });
        });
    }
    group.finish();
}

fn bench_driver(c: &mut Criterion) {
    let payload = token_stream(1_000);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("driver");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("chunk_source_512", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut stream = SseStream::new(ChunkSource::split(&payload, 512));
                let mut count = 0;
                while let Some(item) = stream.next().await {
                    item.unwrap();
                    count += 1;
                }
                count
            })
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse_whole, bench_parse_chunked, bench_driver);
criterion_main!(benches);
