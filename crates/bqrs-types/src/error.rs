/// Errors raised while interpreting schema bytes as typed values.
///
/// These sit one level above `bqrs_wire::WireError`: the bytes were framed
/// correctly, but they name a type or style this format does not define.
///
/// ```text
/// ┌──────────────────────────┬──────────────────────────────────────────┐
/// │ Variant                  │ Cause                                    │
/// ├──────────────────────────┼──────────────────────────────────────────┤
/// │ UnknownColumnTypeTag     │ tag byte is not s/b/i/f/d/u (or 'e')     │
/// │ InvalidLocationStyle     │ style byte is not 0, 1 or 2              │
/// └──────────────────────────┴──────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A column type tag did not match any primitive kind.
    #[error("unknown column type tag {tag:#04X}")]
    UnknownColumnTypeTag { tag: u8 },

    /// A location style byte outside `0..=2`.
    ///
    /// Style 3 (whole-file) exists only above the wire format; producers
    /// write those locations as plain strings, so it is rejected here too.
    #[error("invalid location style {value}")]
    InvalidLocationStyle { value: u8 },
}
