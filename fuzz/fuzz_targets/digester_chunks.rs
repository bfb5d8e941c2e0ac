#![no_main]

use arbitrary::Arbitrary;
use bqrs_decoder::{ChunkList, DecodeError, StreamDigester};
use libfuzzer_sys::fuzz_target;

// Fuzz target: the same read sequence over two partitions of one buffer.
//
// Reads run against the whole buffer as a single chunk and against an
// arbitrary split; results and final positions must agree, errors
// included. Catches seam-buffer bugs: values straddling several chunks,
// empty chunks, seam growth past the minimum size.

#[derive(Debug, Arbitrary)]
enum Read {
    Byte,
    Varint,
    Float,
    Date,
    Str(u8),
    Prefixed,
    Bytes(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u8>,
    reads: Vec<Read>,
    min_seam: u8,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Byte(u8),
    Varint(u32),
    Float(u64),
    Date(bqrs_wire::PackedDate),
    Str(String),
    Bytes(Vec<u8>),
    Failed(String),
}

async fn run(chunks: ChunkList, reads: &[Read], min_seam: usize) -> (Vec<Outcome>, u64) {
    let mut d = StreamDigester::with_min_seam_len(chunks, min_seam);
    let mut outcomes = Vec::new();
    for read in reads {
        let outcome: Result<Outcome, DecodeError> = match read {
            Read::Byte => d.read_byte().await.map(Outcome::Byte),
            Read::Varint => d.read_varint_u32().await.map(Outcome::Varint),
            Read::Float => d.read_f64_le().await.map(|f| Outcome::Float(f.to_bits())),
            Read::Date => d.read_packed_date().await.map(Outcome::Date),
            Read::Str(n) => d.read_utf8_string(usize::from(*n)).await.map(Outcome::Str),
            Read::Prefixed => d.read_length_prefixed_string().await.map(Outcome::Str),
            Read::Bytes(n) => d
                .read_bytes(usize::from(*n))
                .await
                .map(|b| Outcome::Bytes(b.to_vec())),
        };
        match outcome {
            Ok(value) => outcomes.push(value),
            Err(e) => {
                outcomes.push(Outcome::Failed(e.to_string()));
                break;
            }
        }
    }
    (outcomes, d.position())
}

fuzz_target!(|input: Input| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let sizes: Vec<usize> = input.splits.iter().map(|&s| usize::from(s % 16)).collect();
    let min_seam = usize::from(input.min_seam % 64);

    let whole = runtime.block_on(run(
        ChunkList::single(input.data.clone()),
        &input.reads,
        min_seam,
    ));
    let split = runtime.block_on(run(ChunkList::split(input.data, &sizes), &input.reads, min_seam));
    assert_eq!(whole.0, split.0);
    // Position after an error is unspecified; compare only clean runs.
    if !matches!(whole.0.last(), Some(Outcome::Failed(_))) {
        assert_eq!(whole.1, split.1);
    }
});
