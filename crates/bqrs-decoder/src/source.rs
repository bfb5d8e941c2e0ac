use std::collections::VecDeque;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, Take};

use crate::config::DEFAULT_READ_CHUNK_SIZE;
use crate::error::DecodeError;

/// A sequential supplier of byte chunks of arbitrary size.
///
/// Chunk boundaries carry no meaning: a consumer must decode the same
/// values whichever way the bytes happen to be split. `Ok(None)` marks
/// the end of the stream; an empty chunk is allowed and is not the end.
///
/// Dropping a source releases whatever handle backs it.
pub trait ChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, DecodeError>;
}

/// A byte source that can open independent streams over `[start, end)`.
///
/// `end = None` reads to the end of the source. Each stream is separate:
/// reading one never moves another.
pub trait RandomAccessSource {
    type Stream: ChunkSource;

    async fn open_range(&self, start: u64, end: Option<u64>) -> Result<Self::Stream, DecodeError>;
}

/// An explicit, already-materialized sequence of chunks.
///
/// Mostly useful to drive a [`StreamDigester`](crate::StreamDigester)
/// over a chosen partition of a buffer.
#[derive(Clone, Debug, Default)]
pub struct ChunkList {
    chunks: VecDeque<Bytes>,
}

impl ChunkList {
    pub fn new(chunks: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
        }
    }

    /// The whole buffer as one chunk.
    pub fn single(data: impl Into<Bytes>) -> Self {
        Self::new([data.into()])
    }

    /// Split `data` into consecutive chunks of the given sizes.
    ///
    /// Sizes past the end of the data are clamped; whatever remains after
    /// the last size becomes one final chunk. Zero sizes yield empty chunks.
    pub fn split(data: impl Into<Bytes>, sizes: &[usize]) -> Self {
        let mut rest: Bytes = data.into();
        let mut chunks = VecDeque::with_capacity(sizes.len() + 1);
        for &size in sizes {
            chunks.push_back(rest.split_to(size.min(rest.len())));
        }
        if !rest.is_empty() {
            chunks.push_back(rest);
        }
        Self { chunks }
    }

    /// Split `data` into chunks of `chunk_size` bytes (the last may be shorter).
    pub fn fixed(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        let mut rest: Bytes = data.into();
        let chunk_size = chunk_size.max(1);
        let mut chunks = VecDeque::with_capacity(rest.len() / chunk_size + 1);
        while !rest.is_empty() {
            chunks.push_back(rest.split_to(chunk_size.min(rest.len())));
        }
        Self { chunks }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkSource for ChunkList {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, DecodeError> {
        Ok(self.chunks.pop_front())
    }
}

/// An in-memory buffer served as random-access ranges.
///
/// Range streams are zero-copy slices of the shared buffer, cut into
/// `chunk_size` pieces.
#[derive(Clone, Debug)]
pub struct MemorySource {
    data: Bytes,
    chunk_size: usize,
}

impl MemorySource {
    /// Ranges are served as a single chunk each.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk_size: usize::MAX,
        }
    }

    pub fn with_chunk_size(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl RandomAccessSource for MemorySource {
    type Stream = ChunkList;

    async fn open_range(&self, start: u64, end: Option<u64>) -> Result<ChunkList, DecodeError> {
        let len = self.data.len();
        let clamp = |pos: u64| usize::try_from(pos).map_or(len, |p| p.min(len));
        let start = clamp(start);
        let end = end.map_or(len, clamp).max(start);
        Ok(ChunkList::fixed(self.data.slice(start..end), self.chunk_size))
    }
}

/// Chunks pulled from any [`AsyncRead`], at most `chunk_size` bytes each.
#[derive(Debug)]
pub struct ReaderChunks<R> {
    reader: R,
    chunk_size: usize,
}

impl<R> ReaderChunks<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + Unpin> ChunkSource for ReaderChunks<R> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, DecodeError> {
        let mut buf = BytesMut::with_capacity(self.chunk_size);
        let n = self.reader.read_buf(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.freeze()))
    }
}

/// A file on disk. Every range opens its own handle, seeks to `start`
/// and is capped at `end`; the handle closes when the stream is dropped.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    chunk_size: usize,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_chunk_size(path, DEFAULT_READ_CHUNK_SIZE)
    }

    pub fn with_chunk_size(path: impl AsRef<Path>, chunk_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_size: chunk_size.max(1),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RandomAccessSource for FileSource {
    type Stream = ReaderChunks<Take<File>>;

    async fn open_range(&self, start: u64, end: Option<u64>) -> Result<Self::Stream, DecodeError> {
        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(start)).await?;
        let limit = end.map_or(u64::MAX, |end| end.saturating_sub(start));
        Ok(ReaderChunks::new(file.take(limit), self.chunk_size))
    }
}
