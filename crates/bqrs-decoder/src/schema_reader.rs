use bqrs_types::{
    ColumnSchema, ColumnType, ELEMENT_TAG, LocationStyle, PrimitiveKind, TableSchema,
};
use bqrs_wire::header::check_version;
use bqrs_wire::{CONTAINER_VERSION, ContainerHeader, TABLE_VERSION};

use crate::digester::StreamDigester;
use crate::error::DecodeError;
use crate::source::ChunkSource;

/// Parse the container header at the digester's position.
///
/// The version is checked before anything else is read, so a foreign or
/// newer file fails without a partial header.
///
/// # Errors
///
/// [`DecodeError::VersionMismatch`] (`what = "container"`), or any read error.
pub async fn parse_container_header<C: ChunkSource>(
    d: &mut StreamDigester<C>,
) -> Result<ContainerHeader, DecodeError> {
    let version = d.read_varint_u32().await?;
    check_version("container", CONTAINER_VERSION, version)?;
    let table_count = d.read_varint_u32().await?;
    let string_pool_size = d.read_varint_u32().await?;
    Ok(ContainerHeader {
        version,
        table_count,
        string_pool_size,
    })
}

/// Parse a table schema: version, name, tuple count and columns.
///
/// The table's byte-length prefix is not part of the schema; the caller
/// reads it first.
///
/// # Errors
///
/// [`DecodeError::VersionMismatch`] (`what = "table"`), a type error for
/// a bad column type, or any read error.
pub async fn parse_table_schema<C: ChunkSource>(
    d: &mut StreamDigester<C>,
) -> Result<TableSchema, DecodeError> {
    let version = d.read_varint_u32().await?;
    check_version("table", TABLE_VERSION, version)?;
    let name = d.read_length_prefixed_string().await?;
    let tuple_count = d.read_varint_u32().await?;
    let column_count = d.read_varint_u32().await?;

    // The count comes off the wire; let the vector grow rather than trust it.
    let mut columns = Vec::new();
    for _ in 0..column_count {
        let column_name = d.read_length_prefixed_string().await?;
        let column_type = parse_column_type(d).await?;
        columns.push(ColumnSchema::new(column_name, column_type));
    }

    Ok(TableSchema {
        version,
        name,
        tuple_count,
        columns,
    })
}

/// Parse one column type.
///
/// ```text
///   'e' <id tag> <has label> <location style>   element column
///   <tag>                                       primitive column
/// ```
///
/// # Errors
///
/// [`TypeError::UnknownColumnTypeTag`](bqrs_types::TypeError::UnknownColumnTypeTag)
/// or [`TypeError::InvalidLocationStyle`](bqrs_types::TypeError::InvalidLocationStyle),
/// wrapped in [`DecodeError::Type`].
pub async fn parse_column_type<C: ChunkSource>(
    d: &mut StreamDigester<C>,
) -> Result<ColumnType, DecodeError> {
    let tag = d.read_byte().await?;
    if tag != ELEMENT_TAG {
        return Ok(ColumnType::Primitive(PrimitiveKind::from_tag(tag)?));
    }

    let primitive = PrimitiveKind::from_tag(d.read_byte().await?)?;
    let has_label = d.read_byte().await? != 0;
    let location_style = LocationStyle::from_wire(d.read_byte().await?)?;
    Ok(ColumnType::Element {
        primitive,
        location_style,
        has_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqrs_types::TypeError;
    use bqrs_wire::string::write_length_prefixed;
    use bqrs_wire::varint::push_varint;

    #[tokio::test]
    async fn header_fields_in_order() {
        let mut buf = Vec::new();
        ContainerHeader::new(3, 1000).write_to(&mut buf);
        let header = parse_container_header(&mut StreamDigester::from_bytes(buf))
            .await
            .unwrap();
        assert_eq!(header, ContainerHeader::new(3, 1000));
    }

    #[tokio::test]
    async fn wrong_container_version_reports_both_values() {
        let err = parse_container_header(&mut StreamDigester::from_bytes(vec![3, 1, 0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::VersionMismatch {
                what: "container",
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn table_schema_matches_writer() {
        let schema = TableSchema::new(
            "#select",
            2,
            vec![
                ColumnSchema::new("name", ColumnType::Primitive(PrimitiveKind::String)),
                ColumnSchema::new(
                    "call",
                    ColumnType::Element {
                        primitive: PrimitiveKind::Integer,
                        location_style: LocationStyle::FivePart,
                        has_label: true,
                    },
                ),
            ],
        );
        let mut buf = Vec::new();
        schema.write_to(&mut buf);

        let mut d = StreamDigester::from_bytes(buf.clone());
        assert_eq!(parse_table_schema(&mut d).await.unwrap(), schema);
        assert_eq!(d.position(), buf.len() as u64);
    }

    #[tokio::test]
    async fn wrong_table_version_is_fatal() {
        let mut buf = Vec::new();
        push_varint(&mut buf, 7);
        write_length_prefixed(&mut buf, "t");
        let err = parse_table_schema(&mut StreamDigester::from_bytes(buf))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::VersionMismatch {
                what: "table",
                expected: 1,
                actual: 7
            }
        ));
    }

    #[tokio::test]
    async fn primitive_tag_stops_after_one_byte() {
        let mut d = StreamDigester::from_bytes(vec![b'f', b'x']);
        assert_eq!(
            parse_column_type(&mut d).await.unwrap(),
            ColumnType::Primitive(PrimitiveKind::Float)
        );
        assert_eq!(d.position(), 1);
    }

    #[tokio::test]
    async fn element_reads_id_label_and_style() {
        let mut d = StreamDigester::from_bytes(vec![b'e', b's', 0x02, 0x01]);
        assert_eq!(
            parse_column_type(&mut d).await.unwrap(),
            ColumnType::Element {
                primitive: PrimitiveKind::String,
                location_style: LocationStyle::String,
                has_label: true,
            }
        );
    }

    #[tokio::test]
    async fn unknown_tag_is_type_error() {
        let err = parse_column_type(&mut StreamDigester::from_bytes(vec![b'z']))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Type(TypeError::UnknownColumnTypeTag { tag: b'z' })
        ));
    }

    #[tokio::test]
    async fn location_style_three_is_rejected() {
        let err = parse_column_type(&mut StreamDigester::from_bytes(vec![b'e', b'i', 0, 3]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Type(TypeError::InvalidLocationStyle { value: 3 })
        ));
    }
}
