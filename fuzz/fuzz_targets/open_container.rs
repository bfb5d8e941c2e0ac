#![no_main]

use bqrs_decoder::{ContainerReader, DecoderConfig, MemorySource};
use libfuzzer_sys::fuzz_target;

// Fuzz target: open arbitrary bytes as a container and decode every table.
//
// Catches bugs in:
// - Table walk arithmetic (declared lengths shorter than schemas)
// - Column counts and tuple counts far larger than the input
// - String offsets pointing outside the pool or at truncated entries
// - Row decoding running past its table's byte region
fuzz_target!(|data: &[u8]| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let config = DecoderConfig {
        max_string_pool_size: 1 << 20,
        ..DecoderConfig::default()
    };

    runtime.block_on(async {
        let source = MemorySource::with_chunk_size(data.to_vec(), 7);
        let Ok(reader) = ContainerReader::open_with_config(source, config).await else {
            return;
        };
        for table in reader.tables() {
            let Ok(mut stream) = table.read_tuples().await else {
                continue;
            };
            while let Some(tuple) = stream.next().await {
                match tuple {
                    Ok(row) => assert_eq!(row.len(), table.schema().columns.len()),
                    Err(_) => {
                        assert!(stream.next().await.is_none());
                        break;
                    }
                }
            }
            assert!(stream.bytes_consumed() <= table.region().rows_length);
        }
    });
});
