//! Minimal CScriptNum decoding.
//!
//! `bitcoin::blockdata::script::Builder::push_int` already emits the
//! minimal encoding Bitcoin Core accepts (`OP_PUSHNUM_1..OP_PUSHNUM_16` for
//! 1..=16, a shortest little-endian sign-magnitude push otherwise), but
//! `rust-bitcoin` does not expose a public decoder for the push-data side.
//! This module supplies the narrow decode this crate needs: turning a data
//! push back into the non-negative integer it encodes.

/// Maximum size, in bytes, of a CScriptNum push this crate will decode.
/// Timelocks are bounded to `u16::MAX`, so 3 bytes is already generous; we
/// allow the full 5-byte Bitcoin Core maximum for robustness against other
/// minimally-encoded pushes.
const MAX_NUM_SIZE: usize = 5;

/// Decodes a minimally-encoded CScriptNum data push into a non-negative
/// integer.
///
/// Returns `None` if `bytes` is longer than Bitcoin Core's 5-byte limit, is
/// not minimally encoded, or decodes to a negative number (none of the
/// timelock/threshold values this crate emits are ever negative).
pub fn read_scriptnum(bytes: &[u8]) -> Option<i64> {
    if bytes.len() > MAX_NUM_SIZE {
        return None;
    }
    if bytes.is_empty() {
        return Some(0);
    }

    if let Some(&last) = bytes.last() {
        // Minimal encoding: the last byte's value bits must be non-zero,
        // unless the sign bit alone occupies that byte and the previous
        // byte has its own high bit set (distinguishing -0 from a number
        // that needs the extra byte only to avoid being read as negative).
        if last & 0x7f == 0 && (bytes.len() <= 1 || bytes[bytes.len() - 2] & 0x80 == 0) {
            return None;
        }
    }

    let mut result: i64 = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        result |= (byte as i64) << (8 * i);
    }

    let last = bytes[bytes.len() - 1];
    if last & 0x80 != 0 {
        // Sign bit set: value is negative. Clear it and negate.
        result &= !(0x80i64 << (8 * (bytes.len() - 1)));
        result = -result;
    }

    if result < 0 {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_byte_values() {
        assert_eq!(read_scriptnum(&[0x11]), Some(17));
        assert_eq!(read_scriptnum(&[0x7f]), Some(127));
    }

    #[test]
    fn decodes_two_byte_little_endian_values() {
        // 1000 = 0x03E8 -> little endian [0xE8, 0x03]
        assert_eq!(read_scriptnum(&[0xE8, 0x03]), Some(1000));
        // 65535 = 0x00FFFF, needs 3 bytes because 0xFF has its high bit set
        assert_eq!(read_scriptnum(&[0xFF, 0xFF, 0x00]), Some(65535));
    }

    #[test]
    fn rejects_non_minimal_encoding() {
        // A trailing zero byte that isn't needed to clear the sign bit
        assert_eq!(read_scriptnum(&[0x01, 0x00]), None);
    }

    #[test]
    fn empty_push_is_zero() {
        assert_eq!(read_scriptnum(&[]), Some(0));
    }

    #[test]
    fn rejects_oversized_push() {
        assert_eq!(read_scriptnum(&[1, 2, 3, 4, 5, 6]), None);
    }
}
