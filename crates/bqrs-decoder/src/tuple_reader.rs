use bqrs_types::{
    ColumnType, ColumnValue, ElementValue, LocationStyle, LocationValue, PrimitiveKind,
    PrimitiveValue, TableSchema, Tuple,
};
use tracing::trace;

use crate::digester::StreamDigester;
use crate::error::DecodeError;
use crate::source::ChunkSource;
use crate::string_pool::StringPool;

/// Decode one primitive of the given kind.
///
/// ```text
///   string, url   LEB128 offset into the string pool
///   bool          1 byte, nonzero = true
///   int           LEB128 u32
///   float         8 bytes, little-endian f64
///   date          8 bytes, packed
/// ```
///
/// # Errors
///
/// Any read error, or [`DecodeError::StringOffsetOutOfRange`] for a bad
/// pool reference.
pub async fn decode_primitive<C: ChunkSource>(
    d: &mut StreamDigester<C>,
    kind: PrimitiveKind,
    pool: &StringPool,
) -> Result<PrimitiveValue, DecodeError> {
    Ok(match kind {
        PrimitiveKind::String => PrimitiveValue::String(read_pooled(d, pool).await?),
        PrimitiveKind::Boolean => PrimitiveValue::Boolean(d.read_byte().await? != 0),
        PrimitiveKind::Integer => PrimitiveValue::Integer(d.read_varint_u32().await?),
        PrimitiveKind::Float => PrimitiveValue::Float(d.read_f64_le().await?),
        PrimitiveKind::Date => PrimitiveValue::Date(d.read_packed_date().await?),
        PrimitiveKind::Url => PrimitiveValue::Url(read_pooled(d, pool).await?),
    })
}

/// Decode a location in the given style. `None` consumes no bytes.
///
/// # Errors
///
/// Same as [`decode_primitive`].
pub async fn decode_location<C: ChunkSource>(
    d: &mut StreamDigester<C>,
    style: LocationStyle,
    pool: &StringPool,
) -> Result<LocationValue, DecodeError> {
    Ok(match style {
        LocationStyle::None => LocationValue::None,
        LocationStyle::String => LocationValue::String(read_pooled(d, pool).await?),
        LocationStyle::FivePart => LocationValue::FivePart {
            file: read_pooled(d, pool).await?,
            line_start: d.read_varint_u32().await?,
            column_start: d.read_varint_u32().await?,
            line_end: d.read_varint_u32().await?,
            column_end: d.read_varint_u32().await?,
        },
    })
}

/// Decode one column value.
///
/// An element is always read as id, then label when the column has one,
/// then location.
///
/// # Errors
///
/// Same as [`decode_primitive`].
pub async fn decode_column<C: ChunkSource>(
    d: &mut StreamDigester<C>,
    column_type: &ColumnType,
    pool: &StringPool,
) -> Result<ColumnValue, DecodeError> {
    match *column_type {
        ColumnType::Primitive(kind) => {
            Ok(ColumnValue::Primitive(decode_primitive(d, kind, pool).await?))
        }
        ColumnType::Element {
            primitive,
            location_style,
            has_label,
        } => {
            let id = decode_primitive(d, primitive, pool).await?;
            let label = if has_label {
                Some(read_pooled(d, pool).await?)
            } else {
                None
            };
            let location = decode_location(d, location_style, pool).await?;
            Ok(ColumnValue::Element(ElementValue { id, label, location }))
        }
    }
}

/// Decode one row into `out`, replacing its previous contents.
///
/// # Errors
///
/// Same as [`decode_primitive`]. On error `out` holds the columns decoded
/// so far and must not be used as a row.
pub async fn decode_tuple<C: ChunkSource>(
    d: &mut StreamDigester<C>,
    columns: &[ColumnType],
    pool: &StringPool,
    out: &mut Tuple,
) -> Result<(), DecodeError> {
    out.clear();
    for column_type in columns {
        out.push(decode_column(d, column_type, pool).await?);
    }
    Ok(())
}

async fn read_pooled<C: ChunkSource>(
    d: &mut StreamDigester<C>,
    pool: &StringPool,
) -> Result<String, DecodeError> {
    pool.resolve(d.read_varint_u32().await?)
}

/// A lazy sequence of the rows of one table.
///
/// Yields exactly `tuple_count` tuples, each with one value per column,
/// in column order. The stream owns its own byte range; it shares only
/// the string pool with other streams of the same container. After an
/// error the stream is fused and yields `None`.
///
/// Dropping the stream closes its underlying byte source.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), bqrs_decoder::DecodeError> {
/// let reader = bqrs_decoder::ContainerReader::open_file("results.bqrs").await?;
/// let mut rows = reader.table(0).expect("one table").read_tuples().await?;
/// while let Some(row) = rows.next().await {
///     println!("{:?}", row?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TupleStream<C> {
    digester: StreamDigester<C>,
    table: String,
    columns: Vec<ColumnType>,
    pool: StringPool,
    remaining: u32,
    failed: bool,
}

impl<C: ChunkSource> TupleStream<C> {
    /// Stream the rows of `schema` from `digester`, which must sit at the
    /// first row.
    #[must_use]
    pub fn new(digester: StreamDigester<C>, schema: &TableSchema, pool: StringPool) -> Self {
        Self {
            digester,
            table: schema.name.clone(),
            columns: schema.columns.iter().map(|c| c.column_type).collect(),
            pool,
            remaining: schema.tuple_count,
            failed: false,
        }
    }

    /// Rows not yet yielded. Zero once the stream has failed.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Bytes of the table's row region consumed so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.digester.position()
    }

    /// Decode the next row.
    ///
    /// Returns `None` once `tuple_count` rows have been produced or after
    /// an error has been returned.
    pub async fn next(&mut self) -> Option<Result<Tuple, DecodeError>> {
        let mut tuple = Vec::with_capacity(self.columns.len());
        match self.advance(&mut tuple).await? {
            Ok(()) => Some(Ok(tuple)),
            Err(err) => Some(Err(err)),
        }
    }

    /// Decode the next row into `out`, reusing its allocation.
    async fn advance(&mut self, out: &mut Tuple) -> Option<Result<(), DecodeError>> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        match decode_tuple(&mut self.digester, &self.columns, &self.pool, out).await {
            Ok(()) => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    trace!(
                        table = %self.table,
                        bytes = self.digester.position(),
                        "tuple_stream.done"
                    );
                }
                Some(Ok(()))
            }
            Err(err) => {
                trace!(table = %self.table, error = %err, "tuple_stream.failed");
                self.failed = true;
                self.remaining = 0;
                Some(Err(err))
            }
        }
    }

    /// Decode every remaining row.
    ///
    /// # Errors
    ///
    /// The first decode error; rows decoded before it are discarded.
    pub async fn try_collect(mut self) -> Result<Vec<Tuple>, DecodeError> {
        let mut tuples = Vec::new();
        while let Some(tuple) = self.next().await {
            tuples.push(tuple?);
        }
        Ok(tuples)
    }

    /// Call `f` for every remaining row, reusing one row buffer.
    ///
    /// Returns the number of rows visited.
    ///
    /// # Errors
    ///
    /// The first decode error. `f` is not called for the failing row.
    pub async fn for_each_tuple<F>(mut self, mut f: F) -> Result<u32, DecodeError>
    where
        F: FnMut(&[ColumnValue]),
    {
        let mut row = Vec::with_capacity(self.columns.len());
        let mut visited = 0;
        while let Some(result) = self.advance(&mut row).await {
            result?;
            f(&row);
            visited += 1;
        }
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqrs_types::{ColumnSchema, PackedDate};
    use bqrs_wire::string::write_length_prefixed;
    use bqrs_wire::varint::push_varint;

    use crate::source::ChunkList;

    /// Pool with "hello" at 0, "world" at 6 and "src/a.c" at 12.
    fn pool() -> StringPool {
        let mut buf = Vec::new();
        write_length_prefixed(&mut buf, "hello");
        write_length_prefixed(&mut buf, "world");
        write_length_prefixed(&mut buf, "src/a.c");
        StringPool::new(buf)
    }

    fn select_schema(tuple_count: u32) -> TableSchema {
        TableSchema::new(
            "#select",
            tuple_count,
            vec![
                ColumnSchema::new("s", ColumnType::Primitive(PrimitiveKind::String)),
                ColumnSchema::new("n", ColumnType::Primitive(PrimitiveKind::Integer)),
            ],
        )
    }

    fn hello_world_rows() -> Vec<u8> {
        vec![0, 42, 6, 7]
    }

    #[tokio::test]
    async fn every_primitive_kind() {
        let date = PackedDate {
            year: 2024,
            month: 1,
            day: 29,
            hour: 12,
            minute: 0,
            second: 5,
            millisecond: 250,
        };
        let mut rows = vec![6, 1];
        push_varint(&mut rows, 100_000);
        rows.extend_from_slice(&(-0.25f64).to_le_bytes());
        rows.extend_from_slice(&date.to_le_bytes());
        rows.push(12);

        let kinds = [
            PrimitiveKind::String,
            PrimitiveKind::Boolean,
            PrimitiveKind::Integer,
            PrimitiveKind::Float,
            PrimitiveKind::Date,
            PrimitiveKind::Url,
        ];
        let pool = pool();
        let mut d = StreamDigester::from_bytes(rows);
        let mut values = Vec::new();
        for kind in kinds {
            values.push(decode_primitive(&mut d, kind, &pool).await.unwrap());
        }
        assert_eq!(
            values,
            vec![
                PrimitiveValue::String("world".into()),
                PrimitiveValue::Boolean(true),
                PrimitiveValue::Integer(100_000),
                PrimitiveValue::Float(-0.25),
                PrimitiveValue::Date(date),
                PrimitiveValue::Url("src/a.c".into()),
            ]
        );
    }

    #[tokio::test]
    async fn element_reads_id_label_then_location() {
        let column = ColumnType::Element {
            primitive: PrimitiveKind::Integer,
            location_style: LocationStyle::FivePart,
            has_label: true,
        };
        let mut d = StreamDigester::from_bytes(vec![9, 0, 12, 3, 1, 3, 20]);
        let value = decode_column(&mut d, &column, &pool()).await.unwrap();
        assert_eq!(
            value,
            ColumnValue::Element(ElementValue {
                id: PrimitiveValue::Integer(9),
                label: Some("hello".into()),
                location: LocationValue::FivePart {
                    file: "src/a.c".into(),
                    line_start: 3,
                    column_start: 1,
                    line_end: 3,
                    column_end: 20,
                },
            })
        );
    }

    #[tokio::test]
    async fn unlabeled_element_without_location_reads_only_id() {
        let column = ColumnType::Element {
            primitive: PrimitiveKind::String,
            location_style: LocationStyle::None,
            has_label: false,
        };
        let mut d = StreamDigester::from_bytes(vec![0, 0xFF]);
        let value = decode_column(&mut d, &column, &pool()).await.unwrap();
        assert_eq!(d.position(), 1);
        assert_eq!(
            value.as_element().map(|e| &e.location),
            Some(&LocationValue::None)
        );
    }

    #[tokio::test]
    async fn stream_yields_exactly_tuple_count_rows() {
        let stream = TupleStream::new(
            StreamDigester::from_bytes(hello_world_rows()),
            &select_schema(2),
            pool(),
        );
        assert_eq!(stream.remaining(), 2);
        let tuples = stream.try_collect().await.unwrap();
        assert_eq!(
            tuples,
            vec![
                vec![
                    PrimitiveValue::String("hello".into()).into(),
                    PrimitiveValue::Integer(42).into(),
                ],
                vec![
                    PrimitiveValue::String("world".into()).into(),
                    PrimitiveValue::Integer(7).into(),
                ],
            ]
        );
    }

    #[tokio::test]
    async fn one_byte_chunks_give_same_rows() {
        let whole = TupleStream::new(
            StreamDigester::from_bytes(hello_world_rows()),
            &select_schema(2),
            pool(),
        )
        .try_collect()
        .await
        .unwrap();
        let split = TupleStream::new(
            StreamDigester::new(ChunkList::fixed(hello_world_rows(), 1)),
            &select_schema(2),
            pool(),
        )
        .try_collect()
        .await
        .unwrap();
        assert_eq!(whole, split);
    }

    #[tokio::test]
    async fn stream_is_fused_after_error() {
        // Second row points past the pool.
        let mut stream = TupleStream::new(
            StreamDigester::from_bytes(vec![0, 1, 99, 2, 6, 3]),
            &select_schema(3),
            pool(),
        );
        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await,
            Some(Err(DecodeError::StringOffsetOutOfRange { offset: 99, .. }))
        ));
        assert_eq!(stream.remaining(), 0);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn for_each_tuple_reuses_row_buffer() {
        let stream = TupleStream::new(
            StreamDigester::from_bytes(hello_world_rows()),
            &select_schema(2),
            pool(),
        );
        let mut seen = Vec::new();
        let visited = stream
            .for_each_tuple(|row| {
                assert_eq!(row.len(), 2);
                seen.push(row[1].clone());
            })
            .await
            .unwrap();
        assert_eq!(visited, 2);
        assert_eq!(
            seen,
            vec![
                ColumnValue::from(PrimitiveValue::Integer(42)),
                ColumnValue::from(PrimitiveValue::Integer(7)),
            ]
        );
    }

    #[tokio::test]
    async fn truncated_rows_fail_with_end_of_stream() {
        let stream = TupleStream::new(
            StreamDigester::from_bytes(vec![0, 42, 6]),
            &select_schema(2),
            pool(),
        );
        assert!(matches!(
            stream.try_collect().await,
            Err(DecodeError::UnexpectedEndOfStream { .. })
        ));
    }
}
