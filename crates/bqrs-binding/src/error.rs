use bqrs_decoder::DecodeError;
use bqrs_types::ColumnType;

/// Reasons a binding does not fit a table.
///
/// ```text
/// ┌──────────────────────┬───────────────────────────────────────────────┐
/// │ Variant              │ Cause                                         │
/// ├──────────────────────┼───────────────────────────────────────────────┤
/// │ ColumnOutOfRange     │ Binding names a column the table lacks        │
/// │ ColumnBoundTwice     │ Two bindings claim the same column            │
/// │ UnboundColumn        │ A column is left without a binding            │
/// │ TypeMismatch         │ Column type differs from the binding's kind   │
/// │ MissingElementPart   │ Required label/location absent on the column  │
/// │ ForbiddenElementPart │ Forbidden label/location present on column    │
/// │ MultipleRest         │ More than one rest binding                    │
/// │ NoSpecForTable       │ Container table matches no table spec         │
/// │ NoTableForSpec       │ Table spec matches no container table         │
/// │ TableBoundTwice      │ Two container tables match the same spec      │
/// │ RowWidthMismatch     │ Mapped row is not as wide as the table        │
/// │ Decode               │ The bound table's rows failed to decode       │
/// └──────────────────────┴───────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("table {table:?} has {column_count} columns, no column {index}")]
    ColumnOutOfRange {
        table: String,
        index: usize,
        column_count: usize,
    },

    #[error("column {table}[{index}] is bound more than once")]
    ColumnBoundTwice { table: String, index: usize },

    #[error("column {table}[{index}] is not bound")]
    UnboundColumn { table: String, index: usize },

    #[error("column {table}[{index}] has type {actual:?}, binding expects {expected}")]
    TypeMismatch {
        table: String,
        index: usize,
        expected: &'static str,
        actual: ColumnType,
    },

    #[error("element column {table}[{index}] has no {part}, which the binding requires")]
    MissingElementPart {
        table: String,
        index: usize,
        part: &'static str,
    },

    #[error("element column {table}[{index}] has a {part}, which the binding forbids")]
    ForbiddenElementPart {
        table: String,
        index: usize,
        part: &'static str,
    },

    #[error("table {table:?} has more than one rest binding")]
    MultipleRest { table: String },

    #[error("no table spec matches table {table:?}")]
    NoSpecForTable { table: String },

    #[error("no table matches spec {spec:?}")]
    NoTableForSpec { spec: String },

    #[error("more than one table matches spec {spec:?}")]
    TableBoundTwice { spec: String },

    #[error("row has {actual} values, table has {expected} columns")]
    RowWidthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
