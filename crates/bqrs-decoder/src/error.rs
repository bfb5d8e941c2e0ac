use bqrs_types::TypeError;
use bqrs_wire::WireError;

/// Errors that can occur while opening or decoding a BQRS container.
///
/// Where an error surfaces decides how much it takes down with it:
/// anything raised while opening the container (header, any table schema,
/// the table walk) fails the whole open; anything raised while decoding a
/// table's rows fails only that table's [`TupleStream`](crate::TupleStream).
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── VersionMismatch          ← container or table version is wrong
///   ├── UnexpectedEndOfStream    ← chunks ran out mid-read
///   ├── StringOffsetOutOfRange   ← row points past the string pool
///   ├── StringPoolTooLarge       ← declared pool exceeds configured limit
///   ├── TableLengthTooSmall      ← table byte length < its own schema
///   ├── Type(TypeError)          ← unknown column tag, bad location style
///   ├── Wire(WireError)          ← malformed varint, truncated slice
///   └── Io(std::io::Error)       ← from the underlying byte source
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The container or a table record has an unexpected version.
    ///
    /// Both values are reported; nothing is decoded past this point.
    #[error("mismatched {what} version: expected {expected}, got {actual}")]
    VersionMismatch {
        what: &'static str,
        expected: u32,
        actual: u32,
    },

    /// The byte source was exhausted before `requested` bytes starting at
    /// `position` could be read. No partial value is produced.
    #[error("unexpected end of stream at position {position} (needed {requested} bytes)")]
    UnexpectedEndOfStream { position: u64, requested: usize },

    /// A string reference in a row points outside the string pool.
    #[error("string offset {offset} is outside the {pool_size}-byte string pool")]
    StringOffsetOutOfRange { offset: u32, pool_size: usize },

    /// The header declares a string pool larger than
    /// [`DecoderConfig::max_string_pool_size`](crate::DecoderConfig::max_string_pool_size).
    #[error("string pool of {size} bytes exceeds limit {limit}")]
    StringPoolTooLarge { size: u64, limit: u64 },

    /// A table's declared byte length does not even cover its schema.
    #[error("table {index} declares {declared} bytes but its schema alone takes {schema_len}")]
    TableLengthTooSmall {
        index: usize,
        declared: u32,
        schema_len: u64,
    },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<WireError> for DecodeError {
    /// Version mismatches are lifted to [`DecodeError::VersionMismatch`] so
    /// callers match a single variant whichever layer detected them.
    fn from(err: WireError) -> Self {
        match err {
            WireError::VersionMismatch {
                what,
                expected,
                actual,
            } => Self::VersionMismatch {
                what,
                expected,
                actual,
            },
            other => Self::Wire(other),
        }
    }
}
