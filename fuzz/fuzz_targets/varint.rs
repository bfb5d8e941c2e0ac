#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: LEB128 u32 decoding, plus re-encoding of whatever decodes.
//
// Catches bugs in:
// - Fifth-byte overflow (payload bits above u32)
// - Zero-length and truncated input
// - Disagreement between varint_required_len and decode_varint
fuzz_target!(|data: &[u8]| {
    let required = bqrs_wire::varint::varint_required_len(data);
    let Ok((value, consumed)) = bqrs_wire::varint::decode_varint(data) else {
        return;
    };
    assert_eq!(required.ok(), Some(consumed));

    let mut buf = [0u8; bqrs_wire::varint::MAX_VARINT_BYTES];
    let written = bqrs_wire::varint::encode_varint(value, &mut buf);
    let (again, n) = bqrs_wire::varint::decode_varint(&buf[..written]).unwrap();
    assert_eq!((again, n), (value, written));
    assert!(written <= consumed);
});
