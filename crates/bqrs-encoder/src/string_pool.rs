use std::collections::HashMap;

use bqrs_wire::string::encoded_string_length;
use bqrs_wire::varint::push_varint;

use crate::error::EncodeError;

/// Builds the container's string pool, storing each distinct string once.
///
/// Strings are appended in length-prefixed form; the offset of an entry
/// is where its prefix starts. Interning the same text again returns the
/// first offset.
///
/// # Example
///
/// ```rust
/// use bqrs_encoder::StringPoolBuilder;
///
/// let mut pool = StringPoolBuilder::new();
/// let a = pool.intern("main.c").unwrap();
/// let b = pool.intern("util.c").unwrap();
/// assert_eq!(pool.intern("main.c").unwrap(), a);
/// assert_eq!((a, b), (0, 7));
/// assert_eq!(pool.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StringPoolBuilder {
    buffer: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringPoolBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of `value` in the pool, appending it on first use.
    ///
    /// # Errors
    ///
    /// [`EncodeError::TooLarge`] when the pool has outgrown u32 offsets or
    /// `value` is too long for its length prefix.
    pub fn intern(&mut self, value: &str) -> Result<u32, EncodeError> {
        if let Some(&offset) = self.offsets.get(value) {
            return Ok(offset);
        }
        let offset = u32::try_from(self.buffer.len()).map_err(|_| EncodeError::TooLarge {
            what: "string pool",
            size: self.buffer.len(),
        })?;
        let prefix = encoded_string_length(value.len()).ok_or(EncodeError::TooLarge {
            what: "string",
            size: value.len(),
        })?;
        push_varint(&mut self.buffer, prefix);
        self.buffer.extend_from_slice(value.as_bytes());
        self.offsets.insert(value.to_string(), offset);
        Ok(offset)
    }

    /// Number of distinct strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Size of the pool in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
