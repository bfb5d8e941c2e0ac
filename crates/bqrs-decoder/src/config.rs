/// Tuning knobs for the decoder.
///
/// ```text
/// ┌──────────────────────┬──────────┬──────────────────────────────────────────┐
/// │ Field                │ Default  │ Purpose                                  │
/// ├──────────────────────┼──────────┼──────────────────────────────────────────┤
/// │ min_seam_buffer_len  │ 256 B    │ First allocation of the seam buffer      │
/// │ max_string_pool_size │ 256 MiB  │ Reject containers declaring a larger pool│
/// │ read_chunk_size      │ 64 KiB   │ Chunk size for file-backed sources       │
/// └──────────────────────┴──────────┴──────────────────────────────────────────┘
/// ```
///
/// None of these change decoded output; they only bound memory and I/O.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Initial capacity of the seam buffer. It doubles from here as needed.
    pub min_seam_buffer_len: usize,

    /// Upper bound on the string pool the header may declare. The pool is
    /// read into memory in one piece, so this is the guard against a
    /// corrupt size field allocating gigabytes.
    pub max_string_pool_size: u64,

    /// How many bytes a [`FileSource`](crate::FileSource) reads per chunk.
    pub read_chunk_size: usize,
}

/// Default seam buffer starting size.
pub const DEFAULT_MIN_SEAM_BUFFER_LEN: usize = 256;

/// Default string pool limit (256 MiB).
pub const DEFAULT_MAX_STRING_POOL_SIZE: u64 = 256 * 1024 * 1024;

/// Default file read chunk (64 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            min_seam_buffer_len: DEFAULT_MIN_SEAM_BUFFER_LEN,
            max_string_pool_size: DEFAULT_MAX_STRING_POOL_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}
