/// Maximum number of bytes a u32 varint can occupy.
/// ceil(32 / 7) = 5 bytes; the longest valid encoding is
/// `[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]`.
pub const MAX_VARINT_BYTES: usize = 5;

use crate::error::WireError;

/// Encode a `u32` value as an unsigned LEB128 varint into the provided buffer.
///
/// # Returns
///
/// The number of bytes written (1–5).
///
/// # Panics
///
/// Panics if `buf` is shorter than the required encoding length.
/// A 5-byte buffer is always sufficient.
///
/// # Wire format examples
///
/// | Value      | Encoded bytes                  | Length |
/// |------------|--------------------------------|--------|
/// | 0          | `[0x00]`                       | 1      |
/// | 127        | `[0x7F]`                       | 1      |
/// | 128        | `[0x80, 0x01]`                 | 2      |
/// | 16383      | `[0xFF, 0x7F]`                 | 2      |
/// | 2^31 - 1   | `[0xFF, 0xFF, 0xFF, 0xFF, 0x07]` | 5    |
pub fn encode_varint(mut value: u32, buf: &mut [u8]) -> usize {
    let mut i = 0;
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value > 0 {
            byte |= 0x80;
        }

        buf[i] = byte;
        i += 1;

        if value == 0 {
            break;
        }
    }
    i
}

/// Append the varint encoding of `value` to `out`.
pub fn push_varint(out: &mut Vec<u8>, value: u32) {
    let mut scratch = [0u8; MAX_VARINT_BYTES];
    let n = encode_varint(value, &mut scratch);
    out.extend_from_slice(&scratch[..n]);
}

/// Number of bytes needed to decode the varint at the front of `buf`.
///
/// This is the availability probe used by chunked readers. It looks at
/// no more than [`MAX_VARINT_BYTES`] bytes:
///
/// - a byte with the high bit clear ends the varint → its length;
/// - fewer than 5 bytes available and none terminates → `MAX_VARINT_BYTES`,
///   i.e. "need more data" (a reader feeds at most that many and asks again);
/// - 5 bytes available and none terminates → the sequence can never be valid.
///
/// # Errors
///
/// [`WireError::MalformedVarint`] when the first 5 bytes all carry the
/// continuation bit.
pub fn varint_required_len(buf: &[u8]) -> Result<usize, WireError> {
    let window = &buf[..buf.len().min(MAX_VARINT_BYTES)];
    if let Some(end) = window.iter().position(|&b| b & 0x80 == 0) {
        return Ok(end + 1);
    }
    if window.len() == MAX_VARINT_BYTES {
        return Err(WireError::MalformedVarint);
    }
    Ok(MAX_VARINT_BYTES)
}

/// Decode an unsigned LEB128 u32 from the front of `buf`.
///
/// # Returns
///
/// `(decoded_value, bytes_consumed)` on success.
///
/// # Errors
///
/// - [`WireError::MalformedVarint`] if no terminating byte appears within
///   5 bytes, or the fifth byte sets bits above bit 31.
/// - [`WireError::UnexpectedEof`] if the slice ends mid-varint.
pub fn decode_varint(buf: &[u8]) -> Result<(u32, usize), WireError> {
    let mut result: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(WireError::MalformedVarint);
        }

        let data = u32::from(byte & 0x7F);
        if i == MAX_VARINT_BYTES - 1 && data > 0x0F {
            return Err(WireError::MalformedVarint);
        }
        result |= data << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(WireError::UnexpectedEof { offset: buf.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        push_varint(&mut buf, value);
        buf
    }

    #[test]
    fn encode_zero() {
        assert_eq!(encode(0), vec![0x00]);
    }

    #[test]
    fn encode_127() {
        assert_eq!(encode(127), vec![0x7F]);
    }

    #[test]
    fn encode_128() {
        // First value requiring 2 bytes
        assert_eq!(encode(128), vec![0x80, 0x01]);
    }

    #[test]
    fn encode_16383() {
        assert_eq!(encode(16383), vec![0xFF, 0x7F]);
    }

    #[test]
    fn encode_i32_max() {
        assert_eq!(encode(0x7FFF_FFFF), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
    }

    #[test]
    fn encode_u32_max() {
        assert_eq!(encode(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn roundtrip_boundary_values() {
        let values = [0, 1, 127, 128, 16383, 16384, 0x7FFF_FFFF, u32::MAX];
        for &value in &values {
            let encoded = encode(value);
            let (decoded, consumed) = decode_varint(&encoded).unwrap();
            assert_eq!(decoded, value, "roundtrip failed for {value}");
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn decode_with_trailing_bytes() {
        let buf = [0xAC, 0x02, 0xFF, 0xFF];
        let (value, consumed) = decode_varint(&buf).unwrap();
        assert_eq!(value, 300);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn decode_truncated_varint() {
        let result = decode_varint(&[0x80]);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 1 })));
    }

    #[test]
    fn decode_six_continuation_bytes() {
        let result = decode_varint(&[0x80; 6]);
        assert!(matches!(result, Err(WireError::MalformedVarint)));
    }

    #[test]
    fn decode_rejects_bits_above_u32() {
        let result = decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(result, Err(WireError::MalformedVarint)));
    }

    #[test]
    fn probe_finds_terminator() {
        assert_eq!(varint_required_len(&[0x05, 0xFF]).unwrap(), 1);
        assert_eq!(varint_required_len(&[0x80, 0x80, 0x01]).unwrap(), 3);
    }

    #[test]
    fn probe_asks_for_more_on_partial_data() {
        assert_eq!(varint_required_len(&[]).unwrap(), MAX_VARINT_BYTES);
        assert_eq!(varint_required_len(&[0x80, 0x80]).unwrap(), MAX_VARINT_BYTES);
    }

    #[test]
    fn probe_rejects_unterminated_window() {
        let result = varint_required_len(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert!(matches!(result, Err(WireError::MalformedVarint)));
    }
}
