#![warn(clippy::pedantic)]

pub mod date;
pub mod error;
pub mod header;
pub mod string;
pub mod varint;

pub use date::PackedDate;
pub use error::WireError;
pub use header::{CONTAINER_VERSION, ContainerHeader, TABLE_VERSION};
