use std::path::Path;

use bqrs_types::{ContainerSchema, TableSchema};
use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::digester::StreamDigester;
use crate::error::DecodeError;
use crate::schema_reader::{parse_container_header, parse_table_schema};
use crate::source::{FileSource, MemorySource, RandomAccessSource};
use crate::string_pool::StringPool;
use crate::tuple_reader::TupleStream;

/// Where a table's rows live in the container.
///
/// The range `[rows_offset, rows_offset + rows_length)` holds exactly the
/// table's rows; ranges of different tables never overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableByteRegion {
    pub rows_offset: u64,
    pub rows_length: u64,
}

impl TableByteRegion {
    #[must_use]
    pub fn end(&self) -> u64 {
        self.rows_offset + self.rows_length
    }
}

/// Random-access reader over a multi-table container.
///
/// Opening reads the header and walks the tables: for each one it reads
/// the byte length and the schema, then jumps over the rows using that
/// length. No row is decoded during the walk, so reading table *k* never
/// touches the rows of any other table.
///
/// ```text
///   ┌────────┬─────────────┬──────────────────────┬──────────────────────┐
///   │ header │ string pool │ len │ schema │ rows  │ len │ schema │ rows  │ ...
///   └────────┴─────────────┴──────────────────────┴──────────────────────┘
///            ^ pool_offset        rows_offset ^          rows_offset ^
/// ```
///
/// The string pool is read the first time any table's rows are requested
/// and is then shared, read-only, by every [`TupleStream`].
///
/// # Example
///
/// ```rust,no_run
/// use bqrs_decoder::ContainerReader;
///
/// # async fn run() -> Result<(), bqrs_decoder::DecodeError> {
/// let reader = ContainerReader::open_file("results.bqrs").await?;
/// if let Some(table) = reader.find_table_by_name("#select") {
///     let tuples = table.read_tuples().await?.try_collect().await?;
///     println!("{} rows", tuples.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ContainerReader<S> {
    source: S,
    config: DecoderConfig,
    schema: ContainerSchema,
    regions: Vec<TableByteRegion>,
    pool_offset: u64,
    pool: OnceCell<StringPool>,
}

impl ContainerReader<MemorySource> {
    /// Open a container held in memory.
    ///
    /// # Errors
    ///
    /// See [`open_with_config`](Self::open_with_config).
    pub async fn from_bytes(data: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Self::open(MemorySource::new(data)).await
    }
}

impl ContainerReader<FileSource> {
    /// Open a container file. Each table stream gets its own file handle.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] if the file cannot be opened, otherwise see
    /// [`open_with_config`](Self::open_with_config).
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let config = DecoderConfig::default();
        let source = FileSource::with_chunk_size(path, config.read_chunk_size);
        Self::open_with_config(source, config).await
    }
}

impl<S: RandomAccessSource> ContainerReader<S> {
    /// Open a container with the default [`DecoderConfig`].
    ///
    /// # Errors
    ///
    /// See [`open_with_config`](Self::open_with_config).
    pub async fn open(source: S) -> Result<Self, DecodeError> {
        Self::open_with_config(source, DecoderConfig::default()).await
    }

    /// Parse the header and every table schema.
    ///
    /// Any failure here fails the whole open and no partial schema is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::VersionMismatch`] for a bad container or table version.
    /// - [`DecodeError::StringPoolTooLarge`] if the declared pool exceeds
    ///   [`DecoderConfig::max_string_pool_size`].
    /// - [`DecodeError::TableLengthTooSmall`] if a table's byte length does
    ///   not cover its own schema.
    /// - [`DecodeError::Type`] for an unknown column type.
    /// - Read and I/O errors from the source.
    pub async fn open_with_config(source: S, config: DecoderConfig) -> Result<Self, DecodeError> {
        let mut d = StreamDigester::with_min_seam_len(
            source.open_range(0, None).await?,
            config.min_seam_buffer_len,
        );
        let header = parse_container_header(&mut d).await?;

        let pool_size = u64::from(header.string_pool_size);
        if pool_size > config.max_string_pool_size {
            return Err(DecodeError::StringPoolTooLarge {
                size: pool_size,
                limit: config.max_string_pool_size,
            });
        }
        let pool_offset = d.position();
        drop(d);

        let mut tables = Vec::new();
        let mut regions = Vec::new();
        let mut table_offset = pool_offset + pool_size;
        for index in 0..header.table_count as usize {
            let mut d = StreamDigester::with_min_seam_len(
                source.open_range(table_offset, None).await?,
                config.min_seam_buffer_len,
            );
            let declared = d.read_varint_u32().await?;
            let prefix_len = d.position();
            let schema = parse_table_schema(&mut d).await?;
            let schema_len = d.position() - prefix_len;

            let rows_length = u64::from(declared).checked_sub(schema_len).ok_or(
                DecodeError::TableLengthTooSmall {
                    index,
                    declared,
                    schema_len,
                },
            )?;
            let region = TableByteRegion {
                rows_offset: table_offset + d.position(),
                rows_length,
            };
            trace!(
                index,
                name = %schema.name,
                tuples = schema.tuple_count,
                columns = schema.columns.len(),
                rows_offset = region.rows_offset,
                rows_length = region.rows_length,
                "container.table"
            );

            table_offset = region.end();
            tables.push(schema);
            regions.push(region);
        }

        debug!(
            tables = tables.len(),
            string_pool_size = pool_size,
            "container.open"
        );

        Ok(Self {
            source,
            config,
            schema: ContainerSchema {
                version: header.version,
                string_pool_size: header.string_pool_size,
                tables,
            },
            regions,
            pool_offset,
            pool: OnceCell::new(),
        })
    }

    /// Schemas of every table, plus the header fields.
    #[must_use]
    pub fn schema(&self) -> &ContainerSchema {
        &self.schema
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.regions.len()
    }

    /// Every table, in container order.
    pub fn tables(&self) -> impl ExactSizeIterator<Item = TableReader<'_, S>> {
        (0..self.regions.len()).map(move |index| TableReader {
            container: self,
            index,
        })
    }

    #[must_use]
    pub fn table(&self, index: usize) -> Option<TableReader<'_, S>> {
        (index < self.regions.len()).then_some(TableReader {
            container: self,
            index,
        })
    }

    /// The first table called `name`.
    #[must_use]
    pub fn find_table_by_name(&self, name: &str) -> Option<TableReader<'_, S>> {
        self.tables().find(|table| table.schema().name == name)
    }

    /// The container's string pool, read from the source on first use.
    ///
    /// # Errors
    ///
    /// Read errors from the source, for instance a pool cut short by the
    /// end of the file. A failed load is retried on the next call.
    pub async fn string_pool(&self) -> Result<&StringPool, DecodeError> {
        self.pool
            .get_or_try_init(|| async {
                let size = u64::from(self.schema.string_pool_size);
                let stream = self
                    .source
                    .open_range(self.pool_offset, Some(self.pool_offset + size))
                    .await?;
                let mut d =
                    StreamDigester::with_min_seam_len(stream, self.config.min_seam_buffer_len);
                let buffer = d.read_bytes(self.schema.string_pool_size as usize).await?;
                debug!(bytes = size, "container.string_pool_loaded");
                Ok::<_, DecodeError>(StringPool::new(buffer))
            })
            .await
    }
}

/// Lazy handle on one table of a [`ContainerReader`].
pub struct TableReader<'a, S> {
    container: &'a ContainerReader<S>,
    index: usize,
}

impl<'a, S: RandomAccessSource> TableReader<'a, S> {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn schema(&self) -> &'a TableSchema {
        &self.container.schema.tables[self.index]
    }

    #[must_use]
    pub fn region(&self) -> TableByteRegion {
        self.container.regions[self.index]
    }

    /// Open a fresh stream over this table's rows.
    ///
    /// Every call opens an independent sub-stream of the source, so the
    /// table can be read any number of times, interleaved with other
    /// tables. Errors while decoding the rows stay inside the returned
    /// stream.
    ///
    /// # Errors
    ///
    /// Failure to load the string pool or to open the sub-stream.
    pub async fn read_tuples(&self) -> Result<TupleStream<S::Stream>, DecodeError> {
        let pool = self.container.string_pool().await?.clone();
        let region = self.region();
        let stream = self
            .container
            .source
            .open_range(region.rows_offset, Some(region.end()))
            .await?;
        let d =
            StreamDigester::with_min_seam_len(stream, self.container.config.min_seam_buffer_len);
        Ok(TupleStream::new(d, self.schema(), pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqrs_types::{
        ColumnSchema, ColumnType, ColumnValue, LocationStyle, PrimitiveKind, PrimitiveValue,
    };
    use bqrs_wire::ContainerHeader;
    use bqrs_wire::string::write_length_prefixed;
    use bqrs_wire::varint::push_varint;

    /// Assemble a container from pool entries and pre-encoded row bytes.
    fn container(pool_entries: &[&str], tables: &[(TableSchema, Vec<u8>)]) -> Vec<u8> {
        let mut pool = Vec::new();
        for entry in pool_entries {
            write_length_prefixed(&mut pool, entry);
        }

        let mut out = Vec::new();
        ContainerHeader::new(tables.len() as u32, pool.len() as u32).write_to(&mut out);
        out.extend_from_slice(&pool);
        for (schema, rows) in tables {
            let mut body = Vec::new();
            schema.write_to(&mut body);
            body.extend_from_slice(rows);
            push_varint(&mut out, body.len() as u32);
            out.extend_from_slice(&body);
        }
        out
    }

    fn string_int_schema(name: &str, tuple_count: u32) -> TableSchema {
        TableSchema::new(
            name,
            tuple_count,
            vec![
                ColumnSchema::new("s", ColumnType::Primitive(PrimitiveKind::String)),
                ColumnSchema::new("n", ColumnType::Primitive(PrimitiveKind::Integer)),
            ],
        )
    }

    fn row(s: &str, n: u32) -> Vec<ColumnValue> {
        vec![
            PrimitiveValue::String(s.to_string()).into(),
            PrimitiveValue::Integer(n).into(),
        ]
    }

    /// "hello" at 0, "world" at 6.
    fn select_container() -> Vec<u8> {
        container(
            &["hello", "world"],
            &[(string_int_schema("#select", 2), vec![0, 42, 6, 7])],
        )
    }

    fn two_table_container() -> Vec<u8> {
        let element = TableSchema::new(
            "edges",
            1,
            vec![ColumnSchema::new(
                "e",
                ColumnType::Element {
                    primitive: PrimitiveKind::String,
                    location_style: LocationStyle::String,
                    has_label: true,
                },
            )],
        );
        container(
            &["hello", "world"],
            &[
                (string_int_schema("#select", 2), vec![0, 42, 6, 7]),
                (element, vec![6, 0, 6]),
            ],
        )
    }

    #[tokio::test]
    async fn select_scenario_decodes_two_rows() {
        let reader = ContainerReader::from_bytes(select_container()).await.unwrap();
        assert_eq!(reader.schema().version, 2);
        assert_eq!(reader.table_count(), 1);

        let table = reader.find_table_by_name("#select").unwrap();
        let tuples = table.read_tuples().await.unwrap().try_collect().await.unwrap();
        assert_eq!(tuples, vec![row("hello", 42), row("world", 7)]);
    }

    #[tokio::test]
    async fn bad_container_version_returns_no_schema() {
        let mut bytes = select_container();
        bytes[0] = 3;
        let err = ContainerReader::from_bytes(bytes).await.err().unwrap();
        assert!(matches!(
            err,
            DecodeError::VersionMismatch {
                what: "container",
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn regions_tile_the_container() {
        let bytes = two_table_container();
        let reader = ContainerReader::from_bytes(bytes.clone()).await.unwrap();
        let regions: Vec<_> = reader.tables().map(|t| t.region()).collect();
        assert_eq!(regions[0].rows_length, 4);
        assert_eq!(regions[1].rows_length, 3);
        assert!(regions[0].end() < regions[1].rows_offset);
        assert_eq!(regions[1].end(), bytes.len() as u64);
    }

    #[tokio::test]
    async fn second_table_alone_matches_sequential_read() {
        let reader = ContainerReader::from_bytes(two_table_container()).await.unwrap();

        let direct = reader.table(1).unwrap().read_tuples().await.unwrap();
        let direct = direct.try_collect().await.unwrap();

        let first = reader.table(0).unwrap().read_tuples().await.unwrap();
        first.try_collect().await.unwrap();
        let after = reader.table(1).unwrap().read_tuples().await.unwrap();
        assert_eq!(direct, after.try_collect().await.unwrap());

        let element = direct[0][0].as_element().unwrap();
        assert_eq!(element.id.as_str(), Some("world"));
        assert_eq!(element.label.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn streams_are_independent_and_restartable() {
        let reader = ContainerReader::from_bytes(select_container()).await.unwrap();
        let table = reader.table(0).unwrap();
        let mut a = table.read_tuples().await.unwrap();
        let mut b = table.read_tuples().await.unwrap();
        assert_eq!(a.next().await.unwrap().unwrap(), row("hello", 42));
        assert_eq!(b.next().await.unwrap().unwrap(), row("hello", 42));
        assert_eq!(a.next().await.unwrap().unwrap(), row("world", 7));
        assert!(a.next().await.is_none());
        assert_eq!(b.remaining(), 1);
    }

    #[tokio::test]
    async fn corrupt_rows_fail_only_their_table() {
        // First table's second row references offset 99.
        let bytes = container(
            &["hello", "world"],
            &[
                (string_int_schema("bad", 2), vec![0, 1, 99, 2]),
                (string_int_schema("good", 1), vec![6, 3]),
            ],
        );
        let reader = ContainerReader::from_bytes(bytes).await.unwrap();

        let bad = reader.table(0).unwrap().read_tuples().await.unwrap();
        assert!(matches!(
            bad.try_collect().await,
            Err(DecodeError::StringOffsetOutOfRange { offset: 99, .. })
        ));

        let good = reader.find_table_by_name("good").unwrap();
        let tuples = good.read_tuples().await.unwrap().try_collect().await.unwrap();
        assert_eq!(tuples, vec![row("world", 3)]);
    }

    #[tokio::test]
    async fn table_length_shorter_than_schema_fails_open() {
        let mut bytes = Vec::new();
        ContainerHeader::new(1, 0).write_to(&mut bytes);
        let mut schema = Vec::new();
        string_int_schema("t", 0).write_to(&mut schema);
        push_varint(&mut bytes, 2);
        bytes.extend_from_slice(&schema);

        let err = ContainerReader::from_bytes(bytes).await.err().unwrap();
        assert!(matches!(
            err,
            DecodeError::TableLengthTooSmall {
                index: 0,
                declared: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn oversized_pool_is_rejected_at_open() {
        let mut bytes = Vec::new();
        ContainerHeader::new(0, 1000).write_to(&mut bytes);
        let config = DecoderConfig {
            max_string_pool_size: 999,
            ..DecoderConfig::default()
        };
        let err = ContainerReader::open_with_config(MemorySource::new(bytes), config)
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DecodeError::StringPoolTooLarge {
                size: 1000,
                limit: 999
            }
        ));
    }

    #[tokio::test]
    async fn truncated_pool_fails_when_rows_are_read() {
        let mut bytes = Vec::new();
        ContainerHeader::new(0, 50).write_to(&mut bytes);
        bytes.extend_from_slice(b"short");
        let reader = ContainerReader::from_bytes(bytes).await.unwrap();
        assert!(matches!(
            reader.string_pool().await,
            Err(DecodeError::UnexpectedEndOfStream { .. })
        ));
    }

    #[tokio::test]
    async fn small_chunks_give_same_tables() {
        let bytes = two_table_container();
        let whole = ContainerReader::from_bytes(bytes.clone()).await.unwrap();
        let split = ContainerReader::open(MemorySource::with_chunk_size(bytes, 1))
            .await
            .unwrap();
        assert_eq!(whole.schema(), split.schema());
        for index in 0..2 {
            let a = whole.table(index).unwrap().read_tuples().await.unwrap();
            let b = split.table(index).unwrap().read_tuples().await.unwrap();
            assert_eq!(a.try_collect().await.unwrap(), b.try_collect().await.unwrap());
        }
    }

    #[tokio::test]
    async fn file_container_matches_memory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), two_table_container()).unwrap();

        let reader = ContainerReader::open_file(file.path()).await.unwrap();
        let memory = ContainerReader::from_bytes(two_table_container()).await.unwrap();
        assert_eq!(reader.schema(), memory.schema());
        let rows = reader.table(0).unwrap().read_tuples().await.unwrap();
        assert_eq!(
            rows.try_collect().await.unwrap(),
            vec![row("hello", 42), row("world", 7)]
        );
    }
}
