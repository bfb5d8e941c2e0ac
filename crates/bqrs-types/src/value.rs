use std::fmt;

use bqrs_wire::PackedDate;

use crate::schema::{ColumnType, LocationStyle, PrimitiveKind};

/// One decoded row: values in column order, one per column.
pub type Tuple = Vec<ColumnValue>;

/// A decoded primitive.
///
/// Integers are read as unsigned LEB128 and kept unsigned; no sign
/// convention is applied to them at this layer.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    String(String),
    Boolean(bool),
    Integer(u32),
    Float(f64),
    Date(PackedDate),
    Url(String),
}

impl PrimitiveValue {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::String(_) => PrimitiveKind::String,
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Integer(_) => PrimitiveKind::Integer,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Date(_) => PrimitiveKind::Date,
            Self::Url(_) => PrimitiveKind::Url,
        }
    }

    /// The text of a `String` or `Url` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }
}

/// A decoded source location, in one of the three wire styles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationValue {
    None,
    /// Free-form location text. Interpreting it (for example as a
    /// whole-file reference) is left to the consumer.
    String(String),
    FivePart {
        file: String,
        line_start: u32,
        column_start: u32,
        line_end: u32,
        column_end: u32,
    },
}

impl LocationValue {
    #[must_use]
    pub fn style(&self) -> LocationStyle {
        match self {
            Self::None => LocationStyle::None,
            Self::String(_) => LocationStyle::String,
            Self::FivePart { .. } => LocationStyle::FivePart,
        }
    }

    /// True only for a five-part location that names a file.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        matches!(self, Self::FivePart { file, .. } if !file.is_empty())
    }
}

/// The value of an element column: id, then optional label, then location.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementValue {
    pub id: PrimitiveValue,
    pub label: Option<String>,
    pub location: LocationValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnValue {
    Primitive(PrimitiveValue),
    Element(ElementValue),
}

impl ColumnValue {
    /// Whether this value has the shape `column_type` declares.
    ///
    /// For elements this checks the id kind, label presence and location style.
    #[must_use]
    pub fn conforms_to(&self, column_type: &ColumnType) -> bool {
        match (self, column_type) {
            (Self::Primitive(value), ColumnType::Primitive(kind)) => value.kind() == *kind,
            (
                Self::Element(element),
                ColumnType::Element {
                    primitive,
                    location_style,
                    has_label,
                },
            ) => {
                element.id.kind() == *primitive
                    && element.label.is_some() == *has_label
                    && element.location.style() == *location_style
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Primitive(value) => Some(value),
            Self::Element(_) => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&ElementValue> {
        match self {
            Self::Element(element) => Some(element),
            Self::Primitive(_) => None,
        }
    }
}

impl From<PrimitiveValue> for ColumnValue {
    fn from(value: PrimitiveValue) -> Self {
        Self::Primitive(value)
    }
}

impl From<ElementValue> for ColumnValue {
    fn from(value: ElementValue) -> Self {
        Self::Element(value)
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Url(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

/// `None` renders as nothing; a five-part location as
/// `file:line_start:column_start:line_end:column_end`.
impl fmt::Display for LocationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::FivePart {
                file,
                line_start,
                column_start,
                line_end,
                column_end,
            } => write!(f, "{file}:{line_start}:{column_start}:{line_end}:{column_end}"),
        }
    }
}

/// The label (or the id when there is none), then the location in brackets.
impl fmt::Display for ElementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label)?,
            None => write!(f, "{}", self.id)?,
        }
        if self.location != LocationValue::None {
            write!(f, " [{}]", self.location)?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(value) => fmt::Display::fmt(value, f),
            Self::Element(element) => fmt::Display::fmt(element, f),
        }
    }
}
