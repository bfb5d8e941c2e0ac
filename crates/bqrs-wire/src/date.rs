use std::fmt;

/// Byte size of an encoded date.
pub const PACKED_DATE_SIZE: usize = 8;

/// A date/time packed into two little-endian 32-bit words.
///
/// ```text
///   high word (bytes 4..8)              low word (bytes 0..4)
///   ┌───┬───────────────┬───────┐       ┌──────┬──────┬────────┬────────┬────────────┐
///   │ 0 │ year (25 bit) │ month │       │ day  │ hour │ minute │ second │ millis     │
///   │   │ bits 4..29    │ 0..4  │       │27..32│22..27│ 16..22 │ 10..16 │ 0..10      │
///   └───┴───────────────┴───────┘       └──────┴──────┴────────┴────────┴────────────┘
/// ```
///
/// `month` is zero-based exactly as stored (January = 0). All fields are
/// kept raw; nothing is range-checked or normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedDate {
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl PackedDate {
    /// Unpack the 8 wire bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_le_bytes(bytes: [u8; PACKED_DATE_SIZE]) -> Self {
        let low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let high = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);

        Self {
            year: (high & 0x1fff_fff0) >> 4,
            month: (high & 0x0000_000f) as u8,
            day: ((low & 0xf800_0000) >> 27) as u8,
            hour: ((low & 0x07c0_0000) >> 22) as u8,
            minute: ((low & 0x003f_0000) >> 16) as u8,
            second: ((low & 0x0000_fc00) >> 10) as u8,
            millisecond: (low & 0x0000_03ff) as u16,
        }
    }

    /// Pack into the 8 wire bytes. Fields wider than their bit slot are masked.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; PACKED_DATE_SIZE] {
        let high = ((self.year << 4) & 0x1fff_fff0) | (u32::from(self.month) & 0xf);
        let low = ((u32::from(self.day) & 0x1f) << 27)
            | ((u32::from(self.hour) & 0x1f) << 22)
            | ((u32::from(self.minute) & 0x3f) << 16)
            | ((u32::from(self.second) & 0x3f) << 10)
            | (u32::from(self.millisecond) & 0x3ff);

        let mut out = [0u8; PACKED_DATE_SIZE];
        out[..4].copy_from_slice(&low.to_le_bytes());
        out[4..].copy_from_slice(&high.to_le_bytes());
        out
    }
}

impl fmt::Display for PackedDate {
    /// ISO-8601 with a one-based month, e.g. `2024-03-09T14:05:00.250`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
            self.year,
            u32::from(self.month) + 1,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackedDate {
        PackedDate {
            year: 2024,
            month: 2,
            day: 9,
            hour: 14,
            minute: 5,
            second: 59,
            millisecond: 250,
        }
    }

    #[test]
    fn unpacks_known_bit_layout() {
        // high = 2024 << 4 | 2, low = 9<<27 | 14<<22 | 5<<16 | 59<<10 | 250
        let high: u32 = (2024 << 4) | 2;
        let low: u32 = (9 << 27) | (14 << 22) | (5 << 16) | (59 << 10) | 250;
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&low.to_le_bytes());
        bytes[4..].copy_from_slice(&high.to_le_bytes());

        assert_eq!(PackedDate::from_le_bytes(bytes), sample());
    }

    #[test]
    fn pack_is_inverse_of_unpack() {
        let date = sample();
        assert_eq!(PackedDate::from_le_bytes(date.to_le_bytes()), date);
    }

    #[test]
    fn top_bits_of_high_word_are_ignored() {
        let mut bytes = sample().to_le_bytes();
        bytes[7] |= 0xE0;
        assert_eq!(PackedDate::from_le_bytes(bytes), sample());
    }

    #[test]
    fn display_uses_one_based_month() {
        assert_eq!(sample().to_string(), "2024-03-09T14:05:59.250");
    }
}
