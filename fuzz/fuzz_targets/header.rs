#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: ContainerHeader::read_from with arbitrary bytes.
//
// Catches bugs in:
// - Version checking before the other fields are trusted
// - Truncated header handling
// - Consumed-length accounting
fuzz_target!(|data: &[u8]| {
    if let Ok((header, consumed)) = bqrs_wire::ContainerHeader::read_from(data) {
        assert!(consumed <= data.len());
        assert_eq!(header.version, bqrs_wire::CONTAINER_VERSION);
    }
});
