/// Low-level failures while reading or writing BQRS primitives.
///
/// Everything here operates on plain byte slices; the chunked,
/// asynchronous reading lives in `bqrs-decoder`, which wraps these.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A LEB128 sequence did not terminate within 5 bytes, or its
    /// fifth byte carried bits beyond the 32-bit range.
    #[error("malformed LEB128 varint: exceeds the 5-byte limit for u32")]
    MalformedVarint,

    /// Input ended before a complete value could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Container or table record carries a version this crate does not speak.
    #[error("mismatched {what} version: expected {expected}, got {actual}")]
    VersionMismatch {
        what: &'static str,
        expected: u32,
        actual: u32,
    },
}

// `what` is "container" or "table": the two records are versioned
// independently, and a mismatch report has to say which one failed
// along with both numbers.
