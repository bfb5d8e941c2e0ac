//! Explicit column binding for decoded result tables.
//!
//! A [`TableBinding`] states, column by column, how a table is expected to
//! look. Building it checks the table's schema once and yields a
//! [`TupleMapper`], a plain function from decoded rows to [`BoundRow`]s.
//! [`bind_tables`] does the same for every table in a container, matching
//! tables to [`TableSpec`]s by name.

#![warn(clippy::pedantic)]

pub mod binding;
pub mod error;
pub mod tables;

pub use binding::{
    BoundRow, BoundValue, ElementOptions, GroupBinding, Requirement, TableBinding, TupleMapper,
};
pub use error::BindError;
pub use tables::{BoundTable, TableSpec, bind_tables};
