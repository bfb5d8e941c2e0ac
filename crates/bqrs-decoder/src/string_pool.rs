use bqrs_wire::string::decode_length_prefixed;
use bytes::Bytes;

use crate::error::DecodeError;

/// The container-wide string pool.
///
/// Rows refer to strings by byte offset into this pool; each entry is a
/// length-prefixed UTF-8 string. The pool is immutable once loaded and
/// cloning it only bumps a reference count.
#[derive(Clone, Debug, Default)]
pub struct StringPool {
    buffer: Bytes,
}

impl StringPool {
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &Bytes {
        &self.buffer
    }

    /// Resolve the string stored at `offset`.
    ///
    /// Resolution is deterministic: the same offset always yields the same
    /// string. Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// [`DecodeError::StringOffsetOutOfRange`] when `offset` is not inside
    /// the pool, or a wire error when the entry at `offset` runs past the
    /// end of the pool.
    pub fn resolve(&self, offset: u32) -> Result<String, DecodeError> {
        let out_of_range = || DecodeError::StringOffsetOutOfRange {
            offset,
            pool_size: self.buffer.len(),
        };
        let start = usize::try_from(offset).map_err(|_| out_of_range())?;
        let entry = self.buffer.get(start..).filter(|rest| !rest.is_empty());
        let (value, _) = decode_length_prefixed(entry.ok_or_else(out_of_range)?)?;
        Ok(value)
    }
}
