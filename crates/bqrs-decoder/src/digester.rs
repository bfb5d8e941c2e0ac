use bqrs_types::PackedDate;
use bqrs_wire::WireError;
use bqrs_wire::date::PACKED_DATE_SIZE;
use bqrs_wire::string::true_string_length;
use bqrs_wire::varint::{decode_varint, varint_required_len};
use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::config::DEFAULT_MIN_SEAM_BUFFER_LEN;
use crate::error::DecodeError;
use crate::source::{ChunkList, ChunkSource};

/// Byte-exact typed reads over a sequence of chunks.
///
/// The digester hides chunk boundaries: every read returns the same value
/// whether its bytes sit inside one chunk or straddle several. Reads are
/// strictly sequential and `position` only ever grows.
///
/// # How a read works
///
/// Each read supplies a *probe* ("given these available bytes, how many
/// do I need?") and a decoder for exactly that many bytes.
///
/// ```text
///   current chunk:  [ ....consumed.... | avail ............ ]
///                                       ^ offset_in_chunk
///
///   probe(avail) = n
///     n <= avail.len()  → decode &avail[..n] in place, offset += n
///     n >  avail.len()  → seam path:
///
///   seam buffer:    [ avail | bytes of next chunk | next ... ]
///                   re-probe after each chunk until n fits, then decode
/// ```
///
/// On the seam path only as many bytes as the probe asked for are copied
/// out of each new chunk, and the chunk cursor ends up exactly after the
/// last byte the value used. The probe for variable-length values must
/// cope with partial input (see
/// [`varint_required_len`](bqrs_wire::varint::varint_required_len)).
///
/// The seam buffer starts at `min_seam_len` bytes and doubles whenever a
/// read needs more; it is kept for reuse across reads.
pub struct StreamDigester<C> {
    chunks: C,
    current: Bytes,
    offset_in_chunk: usize,
    position_of_chunk: u64,
    seam: Vec<u8>,
    min_seam_len: usize,
    exhausted: bool,
}

impl StreamDigester<ChunkList> {
    /// Digest a single in-memory buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(ChunkList::single(data))
    }
}

impl<C: ChunkSource> StreamDigester<C> {
    #[must_use]
    pub fn new(chunks: C) -> Self {
        Self::with_min_seam_len(chunks, DEFAULT_MIN_SEAM_BUFFER_LEN)
    }

    #[must_use]
    pub fn with_min_seam_len(chunks: C, min_seam_len: usize) -> Self {
        Self {
            chunks,
            current: Bytes::new(),
            offset_in_chunk: 0,
            position_of_chunk: 0,
            seam: Vec::new(),
            min_seam_len: min_seam_len.max(1),
            exhausted: false,
        }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position_of_chunk + self.offset_in_chunk as u64
    }

    fn available(&self) -> &[u8] {
        &self.current[self.offset_in_chunk..]
    }

    /// Replace the current chunk with the next one from the source.
    ///
    /// `requested` and `start` only feed the error report.
    async fn advance_chunk(&mut self, start: u64, requested: usize) -> Result<(), DecodeError> {
        let end_of_stream = DecodeError::UnexpectedEndOfStream {
            position: start,
            requested,
        };
        if self.exhausted {
            return Err(end_of_stream);
        }
        let Some(chunk) = self.chunks.next_chunk().await? else {
            self.exhausted = true;
            return Err(end_of_stream);
        };
        self.position_of_chunk += self.current.len() as u64;
        self.current = chunk;
        self.offset_in_chunk = 0;
        Ok(())
    }

    /// Make the seam buffer at least `needed` bytes long. Existing contents
    /// are kept.
    fn grow_seam(&mut self, needed: usize) {
        if self.seam.len() >= needed {
            return;
        }
        let mut new_len = (self.seam.len() * 2).max(self.min_seam_len);
        while new_len < needed {
            new_len *= 2;
        }
        self.seam.resize(new_len, 0);
    }

    /// Core read: probe, then decode from the chunk or from the seam buffer.
    async fn read_with<T>(
        &mut self,
        required_len: impl Fn(&[u8]) -> Result<usize, WireError>,
        decode: impl FnOnce(&[u8]) -> Result<T, WireError>,
    ) -> Result<T, DecodeError> {
        let needed = required_len(self.available())?;
        if needed <= self.available().len() {
            let value = decode(&self.available()[..needed])?;
            self.offset_in_chunk += needed;
            return Ok(value);
        }
        self.read_across_seam(needed, required_len, decode).await
    }

    async fn read_across_seam<T>(
        &mut self,
        mut needed: usize,
        required_len: impl Fn(&[u8]) -> Result<usize, WireError>,
        decode: impl FnOnce(&[u8]) -> Result<T, WireError>,
    ) -> Result<T, DecodeError> {
        let start = self.position();

        // Everything left in the current chunk belongs to this value.
        let mut filled = self.available().len();
        self.grow_seam(filled);
        let tail = self.offset_in_chunk;
        self.seam[..filled].copy_from_slice(&self.current[tail..]);
        self.offset_in_chunk = self.current.len();

        loop {
            self.advance_chunk(start, needed).await?;

            // Bytes that came from earlier chunks; the rest of `needed` is
            // taken from this one.
            let from_previous = filled;
            loop {
                let consumed = filled - from_previous;
                let take = (needed - filled).min(self.current.len() - consumed);
                self.grow_seam(filled + take);
                self.seam[filled..filled + take]
                    .copy_from_slice(&self.current[consumed..consumed + take]);
                filled += take;

                needed = required_len(&self.seam[..filled])?;
                if needed <= filled {
                    trace!(
                        position = start,
                        bytes = needed,
                        seam_len = self.seam.len(),
                        "digester.seam_read"
                    );
                    let value = decode(&self.seam[..needed])?;
                    self.offset_in_chunk = needed - from_previous;
                    return Ok(value);
                }
                if take == 0 {
                    break;
                }
            }
            self.offset_in_chunk = self.current.len();
        }
    }

    async fn read_known<T>(
        &mut self,
        byte_count: usize,
        decode: impl FnOnce(&[u8]) -> T,
    ) -> Result<T, DecodeError> {
        self.read_with(|_| Ok(byte_count), |bytes| Ok(decode(bytes)))
            .await
    }

    /// Read one byte.
    pub async fn read_byte(&mut self) -> Result<u8, DecodeError> {
        self.read_known(1, |b| b[0]).await
    }

    /// Read one byte as an ASCII character.
    pub async fn read_ascii_char(&mut self) -> Result<char, DecodeError> {
        Ok(char::from(self.read_byte().await?))
    }

    /// Read an unsigned LEB128 u32.
    pub async fn read_varint_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_with(varint_required_len, |bytes| {
            decode_varint(bytes).map(|(value, _)| value)
        })
        .await
    }

    /// Read a little-endian IEEE-754 double.
    pub async fn read_f64_le(&mut self) -> Result<f64, DecodeError> {
        self.read_known(8, |b| {
            f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
        .await
    }

    /// Read an 8-byte packed date.
    pub async fn read_packed_date(&mut self) -> Result<PackedDate, DecodeError> {
        self.read_known(PACKED_DATE_SIZE, |b| {
            PackedDate::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
        .await
    }

    /// Read `byte_count` bytes as UTF-8, replacing invalid sequences.
    pub async fn read_utf8_string(&mut self, byte_count: usize) -> Result<String, DecodeError> {
        self.read_known(byte_count, |b| String::from_utf8_lossy(b).into_owned())
            .await
    }

    /// Read a string in `LEB128(len + 1) ‖ bytes` form.
    pub async fn read_length_prefixed_string(&mut self) -> Result<String, DecodeError> {
        let encoded = self.read_varint_u32().await?;
        self.read_utf8_string(true_string_length(encoded)).await
    }

    /// Read `byte_count` raw bytes.
    ///
    /// Zero-copy when the bytes lie within the current chunk. Otherwise
    /// they are gathered into a fresh buffer rather than the seam buffer,
    /// since bulk reads (the string pool) can be very large.
    pub async fn read_bytes(&mut self, byte_count: usize) -> Result<Bytes, DecodeError> {
        if byte_count <= self.available().len() {
            let start = self.offset_in_chunk;
            self.offset_in_chunk += byte_count;
            return Ok(self.current.slice(start..start + byte_count));
        }

        let start = self.position();
        let mut out = BytesMut::with_capacity(byte_count);
        loop {
            let take = (byte_count - out.len()).min(self.available().len());
            let from = self.offset_in_chunk;
            out.extend_from_slice(&self.current[from..from + take]);
            self.offset_in_chunk += take;
            if out.len() == byte_count {
                return Ok(out.freeze());
            }
            self.advance_chunk(start, byte_count).await?;
        }
    }

    /// Release the digester and hand back its chunk source.
    pub fn into_inner(self) -> C {
        self.chunks
    }
}
