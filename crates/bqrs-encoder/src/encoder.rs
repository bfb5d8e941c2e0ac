use bqrs_types::{ColumnSchema, ColumnValue, TableSchema};
use bqrs_wire::ContainerHeader;
use bqrs_wire::varint::push_varint;

use crate::error::EncodeError;
use crate::row_writer::RowWriter;
use crate::string_pool::StringPoolBuilder;

/// BQRS encoder: builds a container from tables and rows.
///
/// Tables are added with [`add_table`](Self::add_table); rows added with
/// [`add_row`](Self::add_row) go to the most recently added table. Nothing
/// is serialized until [`encode`](Self::encode), which validates every row
/// against its table and then writes:
///
/// ```text
///   header │ string pool │ (table length │ schema │ rows) × tables
/// ```
///
/// Strings from all tables share one pool and each distinct string is
/// stored once. A table's length covers its schema and rows, which is
/// what lets a reader jump from one table to the next.
///
/// # Example
///
/// ```rust
/// use bqrs_encoder::BqrsEncoder;
/// use bqrs_types::{ColumnSchema, ColumnType, PrimitiveKind, PrimitiveValue};
///
/// let bytes = BqrsEncoder::new()
///     .add_table(
///         "#select",
///         vec![
///             ColumnSchema::new("name", ColumnType::Primitive(PrimitiveKind::String)),
///             ColumnSchema::new("count", ColumnType::Primitive(PrimitiveKind::Integer)),
///         ],
///     )
///     .add_row(vec![
///         PrimitiveValue::String("hello".into()).into(),
///         PrimitiveValue::Integer(42).into(),
///     ])
///     .encode()
///     .unwrap();
/// assert_eq!(bytes[0], 2);
/// ```
#[derive(Debug, Default)]
pub struct BqrsEncoder {
    tables: Vec<PendingTable>,
    orphan_rows: usize,
}

#[derive(Debug)]
struct PendingTable {
    name: String,
    columns: Vec<ColumnSchema>,
    rows: Vec<Vec<ColumnValue>>,
}

impl BqrsEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new table. Following rows are added to it.
    pub fn add_table(&mut self, name: &str, columns: Vec<ColumnSchema>) -> &mut Self {
        self.tables.push(PendingTable {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        });
        self
    }

    /// Append a row to the current table.
    ///
    /// A row added before any table is remembered and reported by
    /// [`encode`](Self::encode) as [`EncodeError::RowWithoutTable`].
    pub fn add_row(&mut self, values: Vec<ColumnValue>) -> &mut Self {
        match self.tables.last_mut() {
            Some(table) => table.rows.push(values),
            None => self.orphan_rows += 1,
        }
        self
    }

    /// Add several rows to the current table.
    pub fn add_rows(&mut self, rows: impl IntoIterator<Item = Vec<ColumnValue>>) -> &mut Self {
        for row in rows {
            self.add_row(row);
        }
        self
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Serialize everything added so far.
    ///
    /// An encoder with no tables produces a valid, empty container.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::RowWithoutTable`] if rows were added before any table.
    /// - [`EncodeError::ColumnCountMismatch`] if a row is not as wide as its table.
    /// - [`EncodeError::ValueTypeMismatch`] if a value does not have its
    ///   column's type (for elements: id kind, label presence, location style).
    /// - [`EncodeError::TupleCountOverflow`] if a table has more than
    ///   `u32::MAX` rows.
    /// - [`EncodeError::TooLarge`] if the pool or a table body overflows a
    ///   u32 length.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.orphan_rows > 0 {
            return Err(EncodeError::RowWithoutTable {
                count: self.orphan_rows,
            });
        }

        // Rows are written first so the pool is complete before the header.
        let mut pool = StringPoolBuilder::new();
        let mut bodies = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            bodies.push(Self::serialize_table(table, &mut pool)?);
        }

        let table_count = u32::try_from(self.tables.len()).map_err(|_| EncodeError::TooLarge {
            what: "table list",
            size: self.tables.len(),
        })?;
        let pool_size = u32::try_from(pool.byte_len()).map_err(|_| EncodeError::TooLarge {
            what: "string pool",
            size: pool.byte_len(),
        })?;

        let body_bytes: usize = bodies.iter().map(Vec::len).sum();
        let mut output = Vec::with_capacity(16 + pool.byte_len() + body_bytes + 5 * bodies.len());
        ContainerHeader::new(table_count, pool_size).write_to(&mut output);
        output.extend_from_slice(pool.as_bytes());
        for body in bodies {
            let len = u32::try_from(body.len()).map_err(|_| EncodeError::TooLarge {
                what: "table",
                size: body.len(),
            })?;
            push_varint(&mut output, len);
            output.extend_from_slice(&body);
        }
        Ok(output)
    }

    /// Validate and serialize one table: schema followed by rows.
    fn serialize_table(
        table: &PendingTable,
        pool: &mut StringPoolBuilder,
    ) -> Result<Vec<u8>, EncodeError> {
        let tuple_count =
            u32::try_from(table.rows.len()).map_err(|_| EncodeError::TupleCountOverflow {
                table: table.name.clone(),
                rows: table.rows.len(),
            })?;

        for (row_index, row) in table.rows.iter().enumerate() {
            if row.len() != table.columns.len() {
                return Err(EncodeError::ColumnCountMismatch {
                    table: table.name.clone(),
                    row: row_index,
                    expected: table.columns.len(),
                    actual: row.len(),
                });
            }
            let mismatch = row
                .iter()
                .zip(&table.columns)
                .position(|(value, column)| !value.conforms_to(&column.column_type));
            if let Some(column) = mismatch {
                return Err(EncodeError::ValueTypeMismatch {
                    table: table.name.clone(),
                    row: row_index,
                    column,
                });
            }
        }

        let schema = TableSchema::new(table.name.as_str(), tuple_count, table.columns.clone());
        let mut body = Vec::new();
        schema.write_to(&mut body);

        let mut writer = RowWriter::new(pool);
        for row in &table.rows {
            writer.write_row(row)?;
        }
        body.extend_from_slice(&writer.finish());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqrs_types::{
        ColumnType, ElementValue, LocationStyle, LocationValue, PrimitiveKind, PrimitiveValue,
    };

    fn string_int_columns() -> Vec<ColumnSchema> {
        vec![
            ColumnSchema::new("s", ColumnType::Primitive(PrimitiveKind::String)),
            ColumnSchema::new("n", ColumnType::Primitive(PrimitiveKind::Integer)),
        ]
    }

    fn row(s: &str, n: u32) -> Vec<ColumnValue> {
        vec![
            PrimitiveValue::String(s.into()).into(),
            PrimitiveValue::Integer(n).into(),
        ]
    }

    #[test]
    fn select_scenario_has_expected_bytes() {
        let bytes = BqrsEncoder::new()
            .add_table("#select", string_int_columns())
            .add_row(row("hello", 42))
            .add_row(row("world", 7))
            .encode()
            .unwrap();

        let mut expected = vec![0x02, 0x01, 12];
        expected.extend_from_slice(b"\x06hello\x06world");
        let mut body = Vec::new();
        TableSchema::new("#select", 2, string_int_columns()).write_to(&mut body);
        body.extend_from_slice(&[0, 42, 6, 7]);
        expected.push(u8::try_from(body.len()).unwrap());
        expected.extend_from_slice(&body);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_encoder_writes_empty_container() {
        assert_eq!(BqrsEncoder::new().encode().unwrap(), vec![0x02, 0x00, 0x00]);
    }

    #[test]
    fn strings_are_shared_across_tables() {
        let bytes = BqrsEncoder::new()
            .add_table("a", string_int_columns())
            .add_row(row("shared", 1))
            .add_table("b", string_int_columns())
            .add_row(row("shared", 2))
            .encode()
            .unwrap();
        // Pool holds "shared" once: prefix + 6 bytes.
        assert_eq!(bytes[2], 7);
    }

    #[test]
    fn row_before_table_is_rejected() {
        let err = BqrsEncoder::new()
            .add_row(row("x", 1))
            .add_table("t", string_int_columns())
            .encode()
            .unwrap_err();
        assert!(matches!(err, EncodeError::RowWithoutTable { count: 1 }));
    }

    #[test]
    fn short_row_is_rejected() {
        let err = BqrsEncoder::new()
            .add_table("t", string_int_columns())
            .add_row(vec![PrimitiveValue::String("x".into()).into()])
            .encode()
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ColumnCountMismatch {
                row: 0,
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let err = BqrsEncoder::new()
            .add_table("t", string_int_columns())
            .add_row(row("ok", 1))
            .add_row(vec![
                PrimitiveValue::String("x".into()).into(),
                PrimitiveValue::Boolean(true).into(),
            ])
            .encode()
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ValueTypeMismatch {
                row: 1,
                column: 1,
                ..
            }
        ));
    }

    #[test]
    fn element_label_must_match_column() {
        let column = ColumnType::Element {
            primitive: PrimitiveKind::String,
            location_style: LocationStyle::None,
            has_label: false,
        };
        let err = BqrsEncoder::new()
            .add_table("t", vec![ColumnSchema::new("e", column)])
            .add_row(vec![
                ElementValue {
                    id: PrimitiveValue::String("id".into()),
                    label: Some("unexpected".into()),
                    location: LocationValue::None,
                }
                .into(),
            ])
            .encode()
            .unwrap_err();
        assert!(matches!(err, EncodeError::ValueTypeMismatch { column: 0, .. }));
    }
}
