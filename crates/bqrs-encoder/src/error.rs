/// Errors that can occur while building a BQRS container.
///
/// Rows are validated against their table's columns when
/// [`encode`](crate::BqrsEncoder::encode) runs, so a malformed row never
/// reaches the output.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── RowWithoutTable       ← add_row called before any add_table
///   ├── ColumnCountMismatch   ← row width differs from the table's columns
///   ├── ValueTypeMismatch     ← value does not have its column's type
///   ├── TupleCountOverflow    ← more than u32::MAX rows in one table
///   └── TooLarge              ← pool or table body exceeds u32 framing
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("{count} row(s) added before any table")]
    RowWithoutTable { count: usize },

    #[error("table {table:?} row {row}: expected {expected} values, got {actual}")]
    ColumnCountMismatch {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("table {table:?} row {row}: value in column {column} does not match its type")]
    ValueTypeMismatch {
        table: String,
        row: usize,
        column: usize,
    },

    #[error("table {table:?} has {rows} rows, more than a u32 tuple count allows")]
    TupleCountOverflow { table: String, rows: usize },

    #[error("{what} of {size} bytes does not fit a u32 length")]
    TooLarge { what: &'static str, size: usize },
}
