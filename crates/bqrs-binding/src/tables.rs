use bqrs_decoder::{ContainerReader, RandomAccessSource, TableReader};
use tracing::debug;

use crate::binding::{BoundRow, TableBinding, TupleMapper};
use crate::error::BindError;

/// Name under which the query's main result table is matched.
const SELECT_TABLE: &str = "#select";
const SELECT_ALIAS: &str = "select";

type BindFn = dyn Fn(TableBinding) -> TableBinding + Send + Sync;

/// How to bind one table of a container.
///
/// A spec is matched against table names. By default its only name is its
/// key; [`with_names`](Self::with_names) replaces that list. The `#select`
/// table is matched under the name `select`.
pub struct TableSpec {
    key: String,
    names: Vec<String>,
    bind: Box<BindFn>,
}

impl TableSpec {
    pub fn new(
        key: impl Into<String>,
        bind: impl Fn(TableBinding) -> TableBinding + Send + Sync + 'static,
    ) -> Self {
        let key = key.into();
        Self {
            names: vec![key.clone()],
            key,
            bind: Box::new(bind),
        }
    }

    /// Match any of `names` instead of the key.
    #[must_use]
    pub fn with_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn matches(&self, table_name: &str) -> bool {
        let name = if table_name == SELECT_TABLE {
            SELECT_ALIAS
        } else {
            table_name
        };
        self.names.iter().any(|n| n == name)
    }
}

impl std::fmt::Debug for TableSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSpec")
            .field("key", &self.key)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// A container table together with the mapper its spec produced.
pub struct BoundTable<'a, S> {
    key: String,
    table: TableReader<'a, S>,
    mapper: TupleMapper,
}

impl<'a, S: RandomAccessSource> BoundTable<'a, S> {
    /// Key of the spec this table was bound by.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn table(&self) -> &TableReader<'a, S> {
        &self.table
    }

    #[must_use]
    pub fn mapper(&self) -> &TupleMapper {
        &self.mapper
    }

    /// Decode and map every row of the table.
    ///
    /// # Errors
    ///
    /// The table's first decode or mapping error.
    pub async fn read_rows(&self) -> Result<Vec<BoundRow>, BindError> {
        let mut rows = Vec::new();
        self.for_each_row(|row| rows.push(row)).await?;
        Ok(rows)
    }

    /// Call `f` with each mapped row; returns how many rows were visited.
    ///
    /// # Errors
    ///
    /// The table's first decode or mapping error. `f` is not called for
    /// the failing row.
    pub async fn for_each_row<F>(&self, mut f: F) -> Result<u32, BindError>
    where
        F: FnMut(BoundRow),
    {
        let mut stream = self.table.read_tuples().await?;
        let mut visited = 0;
        while let Some(tuple) = stream.next().await {
            f(self.mapper.map(&tuple?)?);
            visited += 1;
        }
        Ok(visited)
    }
}

/// Bind every table of `reader` to exactly one of `specs`.
///
/// Each table takes the first spec whose names match it. Binding fails if
/// any table matches no spec, if two tables match the same spec, or if a
/// spec is left without a table.
///
/// # Errors
///
/// [`BindError::NoSpecForTable`], [`BindError::TableBoundTwice`],
/// [`BindError::NoTableForSpec`], or the first error from a table's own
/// [`TableBinding::build`].
pub fn bind_tables<'a, S: RandomAccessSource>(
    reader: &'a ContainerReader<S>,
    specs: &[TableSpec],
) -> Result<Vec<BoundTable<'a, S>>, BindError> {
    let mut used = vec![false; specs.len()];
    let mut bound = Vec::with_capacity(reader.table_count());

    for table in reader.tables() {
        let schema = table.schema();
        let Some(spec_index) = specs.iter().position(|s| s.matches(&schema.name)) else {
            return Err(BindError::NoSpecForTable {
                table: schema.name.clone(),
            });
        };
        let spec = &specs[spec_index];
        if used[spec_index] {
            return Err(BindError::TableBoundTwice {
                spec: spec.key.clone(),
            });
        }
        used[spec_index] = true;

        let mapper = (spec.bind)(TableBinding::new(schema)).build()?;
        debug!(
            table = %schema.name,
            spec = %spec.key,
            fields = mapper.field_count(),
            "binding.table"
        );
        bound.push(BoundTable {
            key: spec.key.clone(),
            table,
            mapper,
        });
    }

    if let Some(missing) = used.iter().position(|&u| !u) {
        return Err(BindError::NoTableForSpec {
            spec: specs[missing].key.clone(),
        });
    }
    Ok(bound)
}
