use bqrs_decoder::{ChunkList, ContainerReader, MemorySource, StreamDigester};
use bqrs_tests::{select, wide};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Open a container and decode every row of every table.
async fn decode_all(source: MemorySource) -> usize {
    let reader = ContainerReader::open(source).await.unwrap();
    let mut rows = 0;
    for table in reader.tables() {
        let stream = table.read_tuples().await.unwrap();
        rows += stream.for_each_tuple(|_| {}).await.unwrap() as usize;
    }
    rows
}

fn bench_decode_small(c: &mut Criterion) {
    let payload = select().encode().unwrap();
    let rt = runtime();

    c.bench_function("decode_small", |b| {
        b.iter(|| rt.block_on(decode_all(MemorySource::new(payload.clone()))));
    });
}

fn bench_chunk_sizes(c: &mut Criterion) {
    let payload = wide(4, 2_000).encode().unwrap();
    let rt = runtime();

    let mut group = c.benchmark_group("decode_chunk_size");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for chunk_size in [7usize, 64, 4096, usize::MAX] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    rt.block_on(decode_all(MemorySource::with_chunk_size(
                        payload.clone(),
                        size,
                    )))
                });
            },
        );
    }
    group.finish();
}

fn bench_varints(c: &mut Criterion) {
    let mut payload = Vec::new();
    for i in 0..10_000u32 {
        bqrs_wire::varint::push_varint(&mut payload, i.wrapping_mul(40_503));
    }
    let rt = runtime();

    let mut group = c.benchmark_group("digester_varints");
    for chunk_size in [3usize, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    rt.block_on(async {
                        let mut d = StreamDigester::new(ChunkList::fixed(payload.clone(), size));
                        let mut sum = 0u64;
                        for _ in 0..10_000 {
                            sum += u64::from(d.read_varint_u32().await.unwrap());
                        }
                        sum
                    })
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_decode_small, bench_chunk_sizes, bench_varints);
criterion_main!(benches);
