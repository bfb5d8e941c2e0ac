//! Plain-text rendering shared by `info` and `decode`.

use bqrs_types::{ColumnType, ColumnValue, LocationStyle, TableSchema};

/// Short human-readable name for a column type.
///
/// ```text
/// string                      primitive column
/// element<int> +label @5part  element with label and five-part location
/// element<string> @string     element with a location string, no label
/// ```
pub fn column_type_label(column_type: &ColumnType) -> String {
    match *column_type {
        ColumnType::Primitive(kind) => kind.name().to_string(),
        ColumnType::Element {
            primitive,
            location_style,
            has_label,
        } => {
            let label = if has_label { " +label" } else { "" };
            let location = match location_style {
                LocationStyle::None => "",
                LocationStyle::String => " @string",
                LocationStyle::FivePart => " @5part",
            };
            format!("element<{}>{label}{location}", primitive.name())
        }
    }
}

/// Column names joined by tabs.
pub fn header_line(schema: &TableSchema) -> String {
    schema
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("\t")
}

/// Row values joined by tabs. Tabs and newlines inside values are escaped
/// so each row stays on one line.
pub fn row_line(row: &[ColumnValue]) -> String {
    row.iter()
        .map(|value| escape(&value.to_string()))
        .collect::<Vec<_>>()
        .join("\t")
}

fn escape(field: &str) -> String {
    field
        .replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

/// `"s"` for counts other than one.
pub fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
