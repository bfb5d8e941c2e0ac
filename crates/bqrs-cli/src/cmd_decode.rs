/// Implementation of `bqrs decode`.
///
/// Text output prints one block per table: a `== name (n tuples) ==` line,
/// the tab-separated column names, then one tab-separated line per row.
/// JSON output prints an array with one object per table.
use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow};
use bqrs_decoder::{ContainerReader, RandomAccessSource, TableReader};
use tracing::debug;

use crate::json::JsonTable;
use crate::text::{header_line, plural, row_line};
use crate::{DecodeArgs, OutputFormat};

/// Run the `bqrs decode` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, `--table` names no table,
/// or any selected table fails to decode.
pub async fn run(args: &DecodeArgs) -> Result<()> {
    let reader = ContainerReader::open_file(&args.file)
        .await
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let output = match args.format {
        OutputFormat::Text => render_text(&reader, args.table.as_deref(), args.limit).await?,
        OutputFormat::Json => render_json(&reader, args.table.as_deref(), args.limit).await?,
    };
    print!("{output}");
    Ok(())
}

fn selected_tables<'a, S: RandomAccessSource>(
    reader: &'a ContainerReader<S>,
    name: Option<&str>,
) -> Result<Vec<TableReader<'a, S>>> {
    match name {
        Some(name) => reader
            .find_table_by_name(name)
            .map(|table| vec![table])
            .ok_or_else(|| anyhow!("no table named {name:?}")),
        None => Ok(reader.tables().collect()),
    }
}

/// Decode the selected tables as text, at most `limit` rows each.
pub async fn render_text<S: RandomAccessSource>(
    reader: &ContainerReader<S>,
    table: Option<&str>,
    limit: Option<u32>,
) -> Result<String> {
    let mut out = String::new();
    for table in selected_tables(reader, table)? {
        let schema = table.schema();
        writeln!(
            out,
            "== {} ({} tuple{}) ==",
            schema.name,
            schema.tuple_count,
            plural(schema.tuple_count as usize)
        )?;
        writeln!(out, "{}", header_line(schema))?;

        let mut stream = table.read_tuples().await?;
        let mut printed = 0u32;
        while limit.is_none_or(|max| printed < max) {
            let Some(tuple) = stream.next().await else {
                break;
            };
            let tuple =
                tuple.with_context(|| format!("table {:?}, row {printed}", schema.name))?;
            writeln!(out, "{}", row_line(&tuple))?;
            printed += 1;
        }
        debug!(table = %schema.name, rows = printed, "decode.table");
    }
    Ok(out)
}

/// Decode the selected tables as a pretty-printed JSON array.
pub async fn render_json<S: RandomAccessSource>(
    reader: &ContainerReader<S>,
    table: Option<&str>,
    limit: Option<u32>,
) -> Result<String> {
    let mut tables = Vec::new();
    for table in selected_tables(reader, table)? {
        let schema = table.schema();
        let mut json = JsonTable::new(schema);
        let mut stream = table.read_tuples().await?;
        while limit.is_none_or(|max| (json.tuples.len() as u64) < u64::from(max)) {
            let Some(tuple) = stream.next().await else {
                break;
            };
            let tuple = tuple
                .with_context(|| format!("table {:?}, row {}", schema.name, json.tuples.len()))?;
            json.push_row(&tuple);
        }
        debug!(table = %schema.name, rows = json.tuples.len(), "decode.table");
        tables.push(json);
    }
    let mut out = serde_json::to_string_pretty(&tables)?;
    out.push('\n');
    Ok(out)
}
