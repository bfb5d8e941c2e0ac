use bqrs_types::{ColumnValue, ElementValue, LocationValue, PrimitiveValue};
use bqrs_wire::varint::push_varint;

use crate::error::EncodeError;
use crate::string_pool::StringPoolBuilder;

/// Serializes row values, interning their strings as it goes.
///
/// The writer does not check values against a schema; the encoder does
/// that before handing rows over. Each value is written exactly as the
/// decoder reads it:
///
/// ```text
///   string, url   LEB128 pool offset
///   bool          1 byte (0 or 1)
///   int           LEB128 u32
///   float         8 bytes LE
///   date          8 bytes packed
///   element       id │ label offset (if any) │ location
///   location      nothing │ pool offset │ pool offset + 4 × LEB128
/// ```
pub struct RowWriter<'p> {
    buf: Vec<u8>,
    pool: &'p mut StringPoolBuilder,
}

impl<'p> RowWriter<'p> {
    pub fn new(pool: &'p mut StringPoolBuilder) -> Self {
        Self {
            buf: Vec::new(),
            pool,
        }
    }

    /// Write one row, column by column.
    ///
    /// # Errors
    ///
    /// [`EncodeError::TooLarge`] if the string pool overflows.
    pub fn write_row(&mut self, row: &[ColumnValue]) -> Result<(), EncodeError> {
        for value in row {
            self.write_column(value)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`write_row`](Self::write_row).
    pub fn write_column(&mut self, value: &ColumnValue) -> Result<(), EncodeError> {
        match value {
            ColumnValue::Primitive(primitive) => self.write_primitive(primitive),
            ColumnValue::Element(element) => self.write_element(element),
        }
    }

    /// # Errors
    ///
    /// See [`write_row`](Self::write_row).
    pub fn write_primitive(&mut self, value: &PrimitiveValue) -> Result<(), EncodeError> {
        match value {
            PrimitiveValue::String(s) | PrimitiveValue::Url(s) => self.write_pooled(s)?,
            PrimitiveValue::Boolean(b) => self.buf.push(u8::from(*b)),
            PrimitiveValue::Integer(n) => push_varint(&mut self.buf, *n),
            PrimitiveValue::Float(f) => self.buf.extend_from_slice(&f.to_le_bytes()),
            PrimitiveValue::Date(date) => self.buf.extend_from_slice(&date.to_le_bytes()),
        }
        Ok(())
    }

    fn write_element(&mut self, element: &ElementValue) -> Result<(), EncodeError> {
        self.write_primitive(&element.id)?;
        if let Some(label) = &element.label {
            self.write_pooled(label)?;
        }
        match &element.location {
            LocationValue::None => {}
            LocationValue::String(text) => self.write_pooled(text)?,
            LocationValue::FivePart {
                file,
                line_start,
                column_start,
                line_end,
                column_end,
            } => {
                self.write_pooled(file)?;
                for n in [line_start, column_start, line_end, column_end] {
                    push_varint(&mut self.buf, *n);
                }
            }
        }
        Ok(())
    }

    fn write_pooled(&mut self, value: &str) -> Result<(), EncodeError> {
        let offset = self.pool.intern(value)?;
        push_varint(&mut self.buf, offset);
        Ok(())
    }

    /// Consume the writer and return the row bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqrs_types::PackedDate;

    #[test]
    fn primitives_use_fixed_layouts() {
        let mut pool = StringPoolBuilder::new();
        let mut writer = RowWriter::new(&mut pool);
        writer
            .write_row(&[
                PrimitiveValue::Boolean(true).into(),
                PrimitiveValue::Integer(300).into(),
                PrimitiveValue::Float(1.0).into(),
            ])
            .unwrap();
        let mut expected = vec![0x01, 0xAC, 0x02];
        expected.extend_from_slice(&1.0f64.to_le_bytes());
        assert_eq!(writer.finish(), expected);
    }

    #[test]
    fn strings_become_pool_offsets() {
        let mut pool = StringPoolBuilder::new();
        let mut writer = RowWriter::new(&mut pool);
        writer
            .write_row(&[
                PrimitiveValue::String("a".into()).into(),
                PrimitiveValue::Url("b".into()).into(),
                PrimitiveValue::String("a".into()).into(),
            ])
            .unwrap();
        assert_eq!(writer.finish(), vec![0, 2, 0]);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn element_writes_id_label_location_in_order() {
        let mut pool = StringPoolBuilder::new();
        let mut writer = RowWriter::new(&mut pool);
        writer
            .write_column(&ColumnValue::Element(ElementValue {
                id: PrimitiveValue::Date(PackedDate::default()),
                label: Some("f".into()),
                location: LocationValue::FivePart {
                    file: "x.c".into(),
                    line_start: 1,
                    column_start: 2,
                    line_end: 3,
                    column_end: 4,
                },
            }))
            .unwrap();
        let mut expected = vec![0; 8];
        expected.extend_from_slice(&[0, 2, 1, 2, 3, 4]);
        assert_eq!(writer.finish(), expected);
    }
}
