#![no_main]

use arbitrary::Arbitrary;
use bqrs_decoder::{ContainerReader, MemorySource};
use bqrs_encoder::BqrsEncoder;
use bqrs_types::{
    ColumnSchema, ColumnType, ColumnValue, ElementValue, LocationStyle, LocationValue,
    PackedDate, PrimitiveKind, PrimitiveValue,
};
use libfuzzer_sys::fuzz_target;

// Fuzz target: encode arbitrary tables, decode them back in small chunks.
//
// Column types come from the fuzzer; each row value is generated to fit its
// column so every input encodes. The decoded schemas and rows must equal
// what went in.

#[derive(Debug, Arbitrary)]
struct FuzzValue {
    text: String,
    int: u32,
    float_bits: u64,
    flag: bool,
    date: [u8; 8],
    label: String,
    file: String,
    lines: [u32; 4],
}

#[derive(Debug, Arbitrary)]
struct FuzzTable {
    name: String,
    column_ids: Vec<u8>,
    rows: Vec<Vec<FuzzValue>>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    tables: Vec<FuzzTable>,
    chunk_size: u8,
}

const KINDS: [PrimitiveKind; 6] = [
    PrimitiveKind::String,
    PrimitiveKind::Boolean,
    PrimitiveKind::Integer,
    PrimitiveKind::Float,
    PrimitiveKind::Date,
    PrimitiveKind::Url,
];

fn column_type(id: u8) -> ColumnType {
    let kind = KINDS[usize::from(id % 6)];
    if id & 0x80 == 0 {
        return ColumnType::Primitive(kind);
    }
    let location_style = match (id >> 3) % 3 {
        0 => LocationStyle::None,
        1 => LocationStyle::String,
        _ => LocationStyle::FivePart,
    };
    ColumnType::Element {
        primitive: kind,
        location_style,
        has_label: id & 0x40 != 0,
    }
}

fn primitive(kind: PrimitiveKind, v: &FuzzValue) -> PrimitiveValue {
    match kind {
        PrimitiveKind::String => PrimitiveValue::String(v.text.clone()),
        PrimitiveKind::Boolean => PrimitiveValue::Boolean(v.flag),
        PrimitiveKind::Integer => PrimitiveValue::Integer(v.int),
        // NaN never compares equal; keep floats comparable.
        PrimitiveKind::Float => {
            let f = f64::from_bits(v.float_bits);
            PrimitiveValue::Float(if f.is_nan() { 0.0 } else { f })
        }
        // Round-trip through the packing so out-of-range fields are masked.
        PrimitiveKind::Date => PrimitiveValue::Date(PackedDate::from_le_bytes(v.date)),
        PrimitiveKind::Url => PrimitiveValue::Url(v.text.clone()),
    }
}

fn value(column: ColumnType, v: &FuzzValue) -> ColumnValue {
    match column {
        ColumnType::Primitive(kind) => primitive(kind, v).into(),
        ColumnType::Element {
            primitive: kind,
            location_style,
            has_label,
        } => ElementValue {
            id: primitive(kind, v),
            label: has_label.then(|| v.label.clone()),
            location: match location_style {
                LocationStyle::None => LocationValue::None,
                LocationStyle::String => LocationValue::String(v.file.clone()),
                LocationStyle::FivePart => LocationValue::FivePart {
                    file: v.file.clone(),
                    line_start: v.lines[0],
                    column_start: v.lines[1],
                    line_end: v.lines[2],
                    column_end: v.lines[3],
                },
            },
        }
        .into(),
    }
}

fuzz_target!(|input: FuzzInput| {
    let mut encoder = BqrsEncoder::new();
    let mut expected = Vec::new();
    for table in input.tables.iter().take(8) {
        let types: Vec<ColumnType> = table
            .column_ids
            .iter()
            .take(12)
            .map(|&id| column_type(id))
            .collect();
        let columns: Vec<ColumnSchema> = types
            .iter()
            .enumerate()
            .map(|(i, &t)| ColumnSchema::new(format!("c{i}"), t))
            .collect();
        encoder.add_table(&table.name, columns.clone());

        let mut rows = Vec::new();
        for row in table.rows.iter().take(32) {
            // Rows narrower than the table are padded from the first value.
            let Some(first) = row.first() else { continue };
            let values: Vec<ColumnValue> = types
                .iter()
                .enumerate()
                .map(|(i, &t)| value(t, row.get(i).unwrap_or(first)))
                .collect();
            encoder.add_row(values.clone());
            rows.push(values);
        }
        expected.push((table.name.clone(), columns, rows));
    }

    let bytes = encoder.encode().expect("generated rows always conform");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let source = MemorySource::with_chunk_size(bytes, usize::from(input.chunk_size));
        let reader = ContainerReader::open(source).await.expect("encoder output opens");
        assert_eq!(reader.table_count(), expected.len());
        for (table, (name, columns, rows)) in reader.tables().zip(&expected) {
            assert_eq!(&table.schema().name, name);
            assert_eq!(&table.schema().columns, columns);
            let decoded = table
                .read_tuples()
                .await
                .unwrap()
                .try_collect()
                .await
                .unwrap();
            assert_eq!(&decoded, rows);
        }
    });
});
