use crate::error::{RecordError, Result};

/// Length prefix: one big-endian `u16`.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest payload a 2-byte prefix can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Configuration for record encoding.
#[derive(Debug, Clone)]
pub struct RecordConfig {
    /// Payload ceiling in bytes. Values above [`MAX_PAYLOAD`] are clamped.
    pub max_payload: usize,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            max_payload: MAX_PAYLOAD,
        }
    }
}

/// Encode a payload length as the on-device prefix.
///
/// Wire format at base address `A`:
/// ```text
/// ┌──────────────┬──────────────────────┐
/// │ Length (2B)  │ Payload              │
/// │ BE u16 @ A   │ UTF-8 @ A+2 .. A+2+L │
/// └──────────────┴──────────────────────┘
/// ```
pub fn encode_length_prefix(
    len: usize,
    max_payload: usize,
) -> Result<[u8; LENGTH_PREFIX_SIZE]> {
    let max = max_payload.min(MAX_PAYLOAD);
    if len > max {
        return Err(RecordError::TooLong { size: len, max });
    }
    // `len <= MAX_PAYLOAD` so the cast is lossless.
    Ok((len as u16).to_be_bytes())
}

/// Decode a length prefix, or `None` unless exactly two bytes are given.
pub fn decode_length_prefix(src: &[u8]) -> Option<u16> {
    let bytes: [u8; LENGTH_PREFIX_SIZE] = src.try_into().ok()?;
    Some(u16::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_big_endian() {
        assert_eq!(encode_length_prefix(5, MAX_PAYLOAD).unwrap(), [0x00, 0x05]);
        assert_eq!(encode_length_prefix(0x1234, MAX_PAYLOAD).unwrap(), [0x12, 0x34]);
        assert_eq!(decode_length_prefix(&[0x12, 0x34]), Some(0x1234));
    }

    #[test]
    fn prefix_at_ceiling_is_accepted() {
        assert_eq!(encode_length_prefix(MAX_PAYLOAD, MAX_PAYLOAD).unwrap(), [0xFF, 0xFF]);
    }

    #[test]
    fn prefix_over_ceiling_is_rejected() {
        let err = encode_length_prefix(11, 10).unwrap_err();
        assert!(matches!(err, RecordError::TooLong { size: 11, max: 10 }));
    }

    #[test]
    fn oversized_ceiling_cannot_wrap_the_prefix() {
        // 65536 would encode as 0x0000 if the ceiling were trusted.
        let err = encode_length_prefix(MAX_PAYLOAD + 1, 600_000).unwrap_err();
        assert!(matches!(
            err,
            RecordError::TooLong { max, .. } if max == MAX_PAYLOAD
        ));
    }

    #[test]
    fn decode_requires_exactly_two_bytes() {
        assert_eq!(decode_length_prefix(&[]), None);
        assert_eq!(decode_length_prefix(&[0x01]), None);
        assert_eq!(decode_length_prefix(&[0x00, 0x01, 0x02]), None);
    }

    #[test]
    fn default_config_uses_full_prefix_range() {
        assert_eq!(RecordConfig::default().max_payload, 65_535);
    }
}
