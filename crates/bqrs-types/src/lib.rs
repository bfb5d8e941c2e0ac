#![warn(clippy::pedantic)]

pub mod error;
pub mod schema;
pub mod value;

pub use bqrs_wire::PackedDate;
pub use error::TypeError;
pub use schema::{
    ColumnSchema, ColumnType, ContainerSchema, ELEMENT_TAG, LocationStyle, PrimitiveKind,
    TableSchema,
};
pub use value::{ColumnValue, ElementValue, LocationValue, PrimitiveValue, Tuple};
