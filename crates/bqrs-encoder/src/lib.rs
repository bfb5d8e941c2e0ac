#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;
pub mod row_writer;
pub mod string_pool;

pub use encoder::BqrsEncoder;
pub use error::EncodeError;
pub use string_pool::StringPoolBuilder;
