use bqrs_wire::string::write_length_prefixed;
use bqrs_wire::varint::push_varint;
use bqrs_wire::{CONTAINER_VERSION, TABLE_VERSION};

use crate::error::TypeError;

/// Tag byte that introduces an element column type.
pub const ELEMENT_TAG: u8 = b'e';

/// Primitive value kinds, each identified on the wire by one ASCII byte.
///
/// ```text
/// ┌──────┬─────────┬─────────────────────────────────────┐
/// │ Tag  │ Kind    │ Row encoding                        │
/// ├──────┼─────────┼─────────────────────────────────────┤
/// │ 's'  │ String  │ LEB128 offset into the string pool  │
/// │ 'b'  │ Boolean │ 1 byte, nonzero = true              │
/// │ 'i'  │ Integer │ LEB128 u32                          │
/// │ 'f'  │ Float   │ 8 bytes, IEEE-754 little-endian     │
/// │ 'd'  │ Date    │ 8 bytes, packed bit fields          │
/// │ 'u'  │ Url     │ LEB128 offset into the string pool  │
/// └──────┴─────────┴─────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Integer,
    Float,
    Date,
    Url,
}

impl PrimitiveKind {
    /// Map a tag byte to its kind.
    ///
    /// # Errors
    ///
    /// [`TypeError::UnknownColumnTypeTag`] for any byte outside the table above.
    pub fn from_tag(tag: u8) -> Result<Self, TypeError> {
        match tag {
            b's' => Ok(Self::String),
            b'b' => Ok(Self::Boolean),
            b'i' => Ok(Self::Integer),
            b'f' => Ok(Self::Float),
            b'd' => Ok(Self::Date),
            b'u' => Ok(Self::Url),
            other => Err(TypeError::UnknownColumnTypeTag { tag: other }),
        }
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::String => b's',
            Self::Boolean => b'b',
            Self::Integer => b'i',
            Self::Float => b'f',
            Self::Date => b'd',
            Self::Url => b'u',
        }
    }

    /// Lower-case display name, e.g. `"string"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Date => "date",
            Self::Url => "url",
        }
    }
}

/// How an element column encodes its source location.
///
/// Only these three styles ever appear on the wire. A "whole file" location
/// is written by producers as a `String` location and recognised, if at all,
/// by consumers above this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationStyle {
    /// No location bytes follow.
    None = 0,
    /// One pooled string.
    String = 1,
    /// Pooled file path plus start line/column and end line/column.
    FivePart = 2,
}

impl LocationStyle {
    /// # Errors
    ///
    /// [`TypeError::InvalidLocationStyle`] for any byte other than 0, 1 or 2.
    pub fn from_wire(value: u8) -> Result<Self, TypeError> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::String),
            2 => Ok(Self::FivePart),
            other => Err(TypeError::InvalidLocationStyle { value: other }),
        }
    }

    #[must_use]
    pub fn wire_value(self) -> u8 {
        self as u8
    }
}

/// The declared type of a column.
///
/// Wire layout:
///
/// ```text
///   Primitive:  tag
///   Element:    'e' │ primitive tag │ has_label (1 byte) │ location style (1 byte)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Primitive(PrimitiveKind),
    /// An entity: an id of the given primitive kind, an optional label,
    /// and a location in the given style.
    Element {
        primitive: PrimitiveKind,
        location_style: LocationStyle,
        has_label: bool,
    },
}

impl ColumnType {
    /// Append the wire encoding of this type to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Primitive(kind) => out.push(kind.tag()),
            Self::Element {
                primitive,
                location_style,
                has_label,
            } => {
                out.push(ELEMENT_TAG);
                out.push(primitive.tag());
                out.push(u8::from(has_label));
                out.push(location_style.wire_value());
            }
        }
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Schema of one table (result set). Does not contain any rows.
///
/// Wire layout, preceded on the wire by the table's total byte length:
///
/// ```text
///   version (=1) │ name │ tuple_count │ column_count │ (name │ type) × column_count
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub version: u32,
    pub name: String,
    pub tuple_count: u32,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, tuple_count: u32, columns: Vec<ColumnSchema>) -> Self {
        Self {
            version: TABLE_VERSION,
            name: name.into(),
            tuple_count,
            columns,
        }
    }

    /// Append the wire encoding of this schema (without the length prefix).
    ///
    /// # Panics
    ///
    /// Panics if there are more than `u32::MAX` columns.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        push_varint(out, self.version);
        write_length_prefixed(out, &self.name);
        push_varint(out, self.tuple_count);
        let column_count = u32::try_from(self.columns.len()).expect("column count fits in u32");
        push_varint(out, column_count);
        for column in &self.columns {
            write_length_prefixed(out, &column.name);
            column.column_type.write_to(out);
        }
    }

    /// Position of the column called `name`, if any.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Schema of a whole container: header fields plus every table's schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSchema {
    pub version: u32,
    pub string_pool_size: u32,
    pub tables: Vec<TableSchema>,
}

impl ContainerSchema {
    #[must_use]
    pub fn new(string_pool_size: u32, tables: Vec<TableSchema>) -> Self {
        Self {
            version: CONTAINER_VERSION,
            string_pool_size,
            tables,
        }
    }

    /// First table called `name`.
    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }
}
