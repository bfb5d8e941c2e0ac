use crate::error::WireError;
use crate::varint::{decode_varint, push_varint};

/// Convert an encoded length prefix into the string's byte length.
///
/// Strings are written as `LEB128(len + 1)` followed by `len` UTF-8 bytes.
/// A prefix of `0` also decodes as the empty string; whether the producer
/// ever means something else by it is unknown, so it is not distinguished.
#[must_use]
pub fn true_string_length(encoded: u32) -> usize {
    encoded.saturating_sub(1) as usize
}

/// The encoded prefix for a string of `len` bytes, or `None` when it does
/// not fit a u32.
#[must_use]
pub fn encoded_string_length(len: usize) -> Option<u32> {
    u32::try_from(len).ok().and_then(|len| len.checked_add(1))
}

/// Append `value` in length-prefixed form.
///
/// # Panics
///
/// Panics if `value` is longer than `u32::MAX - 1` bytes. Use
/// [`encoded_string_length`] first where that can happen.
pub fn write_length_prefixed(out: &mut Vec<u8>, value: &str) {
    let len = encoded_string_length(value.len()).expect("string too long for a u32 length prefix");
    push_varint(out, len);
    out.extend_from_slice(value.as_bytes());
}

/// Decode a length-prefixed string at the front of `buf`.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Returns
///
/// `(string, bytes_consumed)`, where `bytes_consumed` includes the prefix.
///
/// # Errors
///
/// - [`WireError::MalformedVarint`] / [`WireError::UnexpectedEof`] from the prefix.
/// - [`WireError::UnexpectedEof`] if fewer than `len` bytes follow it.
pub fn decode_length_prefixed(buf: &[u8]) -> Result<(String, usize), WireError> {
    let (encoded, n) = decode_varint(buf)?;
    let len = true_string_length(encoded);
    let bytes = buf
        .get(n..n + len)
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    Ok((String::from_utf8_lossy(bytes).into_owned(), n + len))
}
