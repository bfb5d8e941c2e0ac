/// Implementation of `bqrs info`.
///
/// Opens the container, which parses the header and every table schema,
/// and prints them without decoding any rows.
///
/// # Output format
///
/// ```text
/// Container: BQRS v2, 2 tables, string pool 12 bytes
/// Table 0: "#select" 2 tuples, rows 33..37 (4 bytes)
///   0  s  string
///   1  n  int
/// Table 1: "edges" 1 tuple, rows 50..52 (2 bytes)
///   0  e  element<string> +label @string
/// ```
use std::fmt::Write as _;

use anyhow::{Context, Result};
use bqrs_decoder::{ContainerReader, RandomAccessSource};

use crate::InfoArgs;
use crate::text::{column_type_label, plural};

/// Run the `bqrs info` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its header or any table
/// schema is invalid.
pub async fn run(args: &InfoArgs) -> Result<()> {
    let reader = ContainerReader::open_file(&args.file)
        .await
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    print!("{}", render(&reader)?);
    Ok(())
}

/// Render the summary printed by `bqrs info`.
pub fn render<S: RandomAccessSource>(reader: &ContainerReader<S>) -> Result<String> {
    let schema = reader.schema();
    let mut out = String::new();
    writeln!(
        out,
        "Container: BQRS v{}, {} table{}, string pool {} bytes",
        schema.version,
        schema.tables.len(),
        plural(schema.tables.len()),
        schema.string_pool_size
    )?;

    for table in reader.tables() {
        let table_schema = table.schema();
        let region = table.region();
        writeln!(
            out,
            "Table {}: {:?} {} tuple{}, rows {}..{} ({} bytes)",
            table.index(),
            table_schema.name,
            table_schema.tuple_count,
            plural(table_schema.tuple_count as usize),
            region.rows_offset,
            region.end(),
            region.rows_length
        )?;
        for (i, column) in table_schema.columns.iter().enumerate() {
            writeln!(
                out,
                "  {i}  {}  {}",
                column.name,
                column_type_label(&column.column_type)
            )?;
        }
    }
    Ok(out)
}
