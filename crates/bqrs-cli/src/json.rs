//! JSON output for `bqrs decode --format json`.

use bqrs_types::{ColumnValue, ElementValue, LocationValue, PrimitiveValue, TableSchema};
use serde::Serialize;
use serde_json::{Value, json};

use crate::text::column_type_label;

/// One table in JSON output.
#[derive(Serialize)]
pub struct JsonTable {
    pub name: String,
    pub tuple_count: u32,
    pub columns: Vec<JsonColumn>,
    pub tuples: Vec<Vec<Value>>,
}

#[derive(Serialize)]
pub struct JsonColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl JsonTable {
    pub fn new(schema: &TableSchema) -> Self {
        Self {
            name: schema.name.clone(),
            tuple_count: schema.tuple_count,
            columns: schema
                .columns
                .iter()
                .map(|c| JsonColumn {
                    name: c.name.clone(),
                    column_type: column_type_label(&c.column_type),
                })
                .collect(),
            tuples: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: &[ColumnValue]) {
        self.tuples.push(row.iter().map(column_value).collect());
    }
}

pub fn column_value(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::Primitive(primitive) => primitive_value(primitive),
        ColumnValue::Element(element) => element_value(element),
    }
}

/// Dates become ISO-8601 strings; non-finite floats become `null`.
fn primitive_value(value: &PrimitiveValue) -> Value {
    match value {
        PrimitiveValue::String(s) | PrimitiveValue::Url(s) => Value::from(s.as_str()),
        PrimitiveValue::Boolean(b) => Value::from(*b),
        PrimitiveValue::Integer(n) => Value::from(*n),
        PrimitiveValue::Float(x) => Value::from(*x),
        PrimitiveValue::Date(date) => Value::from(date.to_string()),
    }
}

fn element_value(element: &ElementValue) -> Value {
    json!({
        "id": primitive_value(&element.id),
        "label": element.label,
        "location": location_value(&element.location),
    })
}

fn location_value(location: &LocationValue) -> Value {
    match location {
        LocationValue::None => Value::Null,
        LocationValue::String(s) => Value::from(s.as_str()),
        LocationValue::FivePart {
            file,
            line_start,
            column_start,
            line_end,
            column_end,
        } => json!({
            "file": file,
            "line_start": line_start,
            "column_start": column_start,
            "line_end": line_end,
            "column_end": column_end,
        }),
    }
}
