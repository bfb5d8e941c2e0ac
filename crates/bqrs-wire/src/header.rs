use crate::error::WireError;
use crate::varint::{decode_varint, push_varint};

/// Version of the container record (the header of the whole file).
pub const CONTAINER_VERSION: u32 = 2;

/// Version of each table record. Versioned separately from the container.
pub const TABLE_VERSION: u32 = 1;

/// Container header: the first three varints of every BQRS file.
///
/// ```text
/// ┌──────────────────┬──────────┬────────────────────────────────────┐
/// │ Field            │ Encoding │ Description                        │
/// ├──────────────────┼──────────┼────────────────────────────────────┤
/// │ version          │ LEB128   │ Always 2                           │
/// │ table_count      │ LEB128   │ Number of table records that follow│
/// │ string_pool_size │ LEB128   │ Byte size of the shared pool       │
/// └──────────────────┴──────────┴────────────────────────────────────┘
/// ```
///
/// The string pool bytes follow the header immediately, then the tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u32,
    pub table_count: u32,
    pub string_pool_size: u32,
}

impl ContainerHeader {
    /// Create a header with the current container version.
    #[must_use]
    pub fn new(table_count: u32, string_pool_size: u32) -> Self {
        Self {
            version: CONTAINER_VERSION,
            table_count,
            string_pool_size,
        }
    }

    /// Append the encoded header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        push_varint(out, self.version);
        push_varint(out, self.table_count);
        push_varint(out, self.string_pool_size);
    }

    /// Parse a header from the front of `buf`.
    ///
    /// The version is checked before anything else is read, so a foreign
    /// file fails with [`WireError::VersionMismatch`] rather than with
    /// whatever its next bytes happen to look like.
    ///
    /// # Returns
    ///
    /// `(header, bytes_consumed)`.
    ///
    /// # Errors
    ///
    /// - [`WireError::VersionMismatch`] if the version is not [`CONTAINER_VERSION`].
    /// - [`WireError::UnexpectedEof`] / [`WireError::MalformedVarint`] from the varints.
    pub fn read_from(buf: &[u8]) -> Result<(Self, usize), WireError> {
        let mut cursor = 0;

        let (version, n) = decode_varint(buf)?;
        cursor += n;
        check_version("container", CONTAINER_VERSION, version)?;

        let (table_count, n) = decode_varint(&buf[cursor..])?;
        cursor += n;

        let (string_pool_size, n) = decode_varint(&buf[cursor..])?;
        cursor += n;

        Ok((
            Self {
                version,
                table_count,
                string_pool_size,
            },
            cursor,
        ))
    }
}

/// Fail with [`WireError::VersionMismatch`] unless `actual == expected`.
///
/// # Errors
///
/// See above.
pub fn check_version(what: &'static str, expected: u32, actual: u32) -> Result<(), WireError> {
    if actual == expected {
        Ok(())
    } else {
        Err(WireError::VersionMismatch {
            what,
            expected,
            actual,
        })
    }
}
