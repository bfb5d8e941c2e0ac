#![warn(clippy::pedantic)]
#![allow(async_fn_in_trait)]

pub mod config;
pub mod digester;
pub mod error;
pub mod reader;
pub mod schema_reader;
pub mod source;
pub mod string_pool;
pub mod tuple_reader;

pub use config::DecoderConfig;
pub use digester::StreamDigester;
pub use error::DecodeError;
pub use reader::{ContainerReader, TableByteRegion, TableReader};
pub use source::{
    ChunkList, ChunkSource, FileSource, MemorySource, RandomAccessSource, ReaderChunks,
};
pub use string_pool::StringPool;
pub use tuple_reader::TupleStream;
