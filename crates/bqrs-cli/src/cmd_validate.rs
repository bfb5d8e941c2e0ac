/// Implementation of `bqrs validate`.
///
/// Opens the container and decodes every table on its own stream. Each
/// table gets a `✓` or `✗` line; a failure in one table does not stop the
/// others from being checked. The command fails if the header or any table
/// fails.
///
/// # Output
///
/// ```text
/// ✓ Header: BQRS v2, 2 tables, string pool 12 bytes
/// ✓ Table 0 "#select": 2 tuples decoded
/// ✗ Table 1 "edges": string offset 99 is outside the 12-byte string pool
/// ```
///
/// A table also fails when its rows decode cleanly but do not use up the
/// byte region its declared length gives them.
use anyhow::{Context, Result, anyhow};
use bqrs_decoder::{ContainerReader, FileSource, RandomAccessSource, TableReader};
use tracing::warn;

use crate::ValidateArgs;
use crate::text::plural;

/// Run the `bqrs validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if validation fails.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let metadata = tokio::fs::metadata(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    if !metadata.is_file() {
        return Err(anyhow!("{} is not a file", args.file.display()));
    }

    let report = validate(FileSource::new(&args.file)).await;
    print!("{}", report.text);
    if report.passed {
        Ok(())
    } else {
        Err(anyhow!("validation failed"))
    }
}

/// Outcome of validating one container.
pub struct Report {
    pub text: String,
    pub passed: bool,
}

/// Open `source` and decode every table.
pub async fn validate<S: RandomAccessSource>(source: S) -> Report {
    let reader = match ContainerReader::open(source).await {
        Ok(reader) => reader,
        Err(e) => {
            return Report {
                text: format!("✗ Header: {e}\n"),
                passed: false,
            };
        }
    };

    let schema = reader.schema();
    let mut text = format!(
        "✓ Header: BQRS v{}, {} table{}, string pool {} bytes\n",
        schema.version,
        schema.tables.len(),
        plural(schema.tables.len()),
        schema.string_pool_size
    );
    let mut passed = true;
    for table in reader.tables() {
        let name = &table.schema().name;
        match check_table(&table).await {
            Ok(decoded) => text.push_str(&format!(
                "✓ Table {} {name:?}: {decoded} tuple{} decoded\n",
                table.index(),
                plural(decoded as usize)
            )),
            Err(e) => {
                passed = false;
                warn!(table = %name, error = %e, "validate.table_failed");
                text.push_str(&format!("✗ Table {} {name:?}: {e:#}\n", table.index()));
            }
        }
    }
    Report { text, passed }
}

/// Decode every row of `table` and check the rows fill its byte region.
async fn check_table<S: RandomAccessSource>(table: &TableReader<'_, S>) -> Result<u32> {
    let mut stream = table.read_tuples().await?;
    let mut decoded = 0u32;
    while let Some(tuple) = stream.next().await {
        tuple.with_context(|| format!("row {decoded}"))?;
        decoded += 1;
    }

    let rows_length = table.region().rows_length;
    let consumed = stream.bytes_consumed();
    if consumed != rows_length {
        return Err(anyhow!(
            "rows use {consumed} of {rows_length} bytes ({} trailing)",
            rows_length.saturating_sub(consumed)
        ));
    }
    Ok(decoded)
}
