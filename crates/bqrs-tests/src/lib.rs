//! Shared fixtures for the BQRS integration tests, benches and the golden
//! file generator.
//!
//! Each fixture builds an encoder for one container under
//! `tests/golden/<name>/result.bqrs`. The generator writes them; the
//! conformance suite checks that the encoder still produces exactly the
//! committed bytes.

use std::path::PathBuf;

use bqrs_encoder::BqrsEncoder;
use bqrs_types::{
    ColumnSchema, ColumnType, ElementValue, LocationStyle, LocationValue, PackedDate,
    PrimitiveKind, PrimitiveValue,
};

/// Names of every golden fixture, in generation order.
pub const GOLDEN_FIXTURES: &[&str] = &["select", "elements", "empty"];

/// Path of a fixture's committed container.
#[must_use]
pub fn golden_path(fixture: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(fixture)
        .join("result.bqrs")
}

/// Build the encoder for a named fixture.
///
/// # Panics
///
/// On an unknown fixture name.
#[must_use]
pub fn golden_encoder(fixture: &str) -> BqrsEncoder {
    match fixture {
        "select" => select(),
        "elements" => elements(),
        "empty" => BqrsEncoder::new(),
        other => panic!("unknown golden fixture {other:?}"),
    }
}

/// A single `#select` table of `(s: string, n: int)` with two rows.
#[must_use]
pub fn select() -> BqrsEncoder {
    let mut encoder = BqrsEncoder::new();
    encoder
        .add_table(
            "#select",
            vec![
                ColumnSchema::new("s", ColumnType::Primitive(PrimitiveKind::String)),
                ColumnSchema::new("n", ColumnType::Primitive(PrimitiveKind::Integer)),
            ],
        )
        .add_row(vec![
            PrimitiveValue::String("hello".into()).into(),
            PrimitiveValue::Integer(42).into(),
        ])
        .add_row(vec![
            PrimitiveValue::String("world".into()).into(),
            PrimitiveValue::Integer(7).into(),
        ]);
    encoder
}

fn call(id: &str, label: &str, file: &str, lines: [u32; 4]) -> ElementValue {
    ElementValue {
        id: PrimitiveValue::String(id.into()),
        label: Some(label.into()),
        location: LocationValue::FivePart {
            file: file.into(),
            line_start: lines[0],
            column_start: lines[1],
            line_end: lines[2],
            column_end: lines[3],
        },
    }
}

/// Every column type: a labelled five-part element plus url, bool, float
/// and date in `#select`, and string/no location elements in `edges`.
#[must_use]
pub fn elements() -> BqrsEncoder {
    let call_column = ColumnType::Element {
        primitive: PrimitiveKind::String,
        location_style: LocationStyle::FivePart,
        has_label: true,
    };
    let node = |location_style| ColumnType::Element {
        primitive: PrimitiveKind::Integer,
        location_style,
        has_label: false,
    };
    let url = "https://example.com/a";

    let mut encoder = BqrsEncoder::new();
    encoder
        .add_table(
            "#select",
            vec![
                ColumnSchema::new("call", call_column),
                ColumnSchema::new("url", ColumnType::Primitive(PrimitiveKind::Url)),
                ColumnSchema::new("flag", ColumnType::Primitive(PrimitiveKind::Boolean)),
                ColumnSchema::new("score", ColumnType::Primitive(PrimitiveKind::Float)),
                ColumnSchema::new("when", ColumnType::Primitive(PrimitiveKind::Date)),
            ],
        )
        .add_row(vec![
            call("fn-main", "main", "src/main.c", [1, 1, 10, 2]).into(),
            PrimitiveValue::Url(url.into()).into(),
            PrimitiveValue::Boolean(true).into(),
            PrimitiveValue::Float(0.5).into(),
            PrimitiveValue::Date(PackedDate {
                year: 2024,
                month: 2,
                day: 9,
                hour: 14,
                minute: 5,
                second: 0,
                millisecond: 250,
            })
            .into(),
        ])
        .add_row(vec![
            call("fn-util", "util", "src/util.c", [3, 5, 7, 1]).into(),
            PrimitiveValue::Url(url.into()).into(),
            PrimitiveValue::Boolean(false).into(),
            PrimitiveValue::Float(-1.25).into(),
            PrimitiveValue::Date(PackedDate {
                year: 1999,
                month: 11,
                day: 31,
                hour: 23,
                minute: 59,
                second: 59,
                millisecond: 999,
            })
            .into(),
        ])
        .add_table(
            "edges",
            vec![
                ColumnSchema::new("src", node(LocationStyle::String)),
                ColumnSchema::new("dst", node(LocationStyle::None)),
            ],
        )
        .add_row(vec![
            ElementValue {
                id: PrimitiveValue::Integer(7),
                label: None,
                location: LocationValue::String("file:///src/main.c:0:0:0:0".into()),
            }
            .into(),
            ElementValue {
                id: PrimitiveValue::Integer(8),
                label: None,
                location: LocationValue::None,
            }
            .into(),
        ]);
    encoder
}

/// A container with `tables` tables of `rows` rows each, mixing pooled
/// strings, integers and five-part elements. Used by benches and the
/// chunking tests.
#[must_use]
pub fn wide(tables: usize, rows: u32) -> BqrsEncoder {
    let columns = vec![
        ColumnSchema::new(
            "site",
            ColumnType::Element {
                primitive: PrimitiveKind::String,
                location_style: LocationStyle::FivePart,
                has_label: true,
            },
        ),
        ColumnSchema::new("message", ColumnType::Primitive(PrimitiveKind::String)),
        ColumnSchema::new("count", ColumnType::Primitive(PrimitiveKind::Integer)),
        ColumnSchema::new("ratio", ColumnType::Primitive(PrimitiveKind::Float)),
    ];

    let mut encoder = BqrsEncoder::new();
    for t in 0..tables {
        encoder.add_table(&format!("table_{t}"), columns.clone());
        for r in 0..rows {
            encoder.add_row(vec![
                call(
                    &format!("id-{t}-{r}"),
                    &format!("fn_{}", r % 17),
                    &format!("src/file_{}.c", r % 5),
                    [r, 1, r + 3, 80],
                )
                .into(),
                PrimitiveValue::String(format!("message {}", r % 11)).into(),
                PrimitiveValue::Integer(r.wrapping_mul(2_654_435_761)).into(),
                PrimitiveValue::Float(f64::from(r) / 3.0).into(),
            ]);
        }
    }
    encoder
}
