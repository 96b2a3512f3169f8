//! Variable-length integer (varint) operations for SQLite format.

use bytes::Buf;

use super::error::{DecodeError, Result};

const VARINT_MAX_BYTES: usize = 9;
const VARINT_CONTINUATION_BIT: u8 = 0x80;
const VARINT_DATA_MASK: u8 = 0x7F;

/// Largest value representable in `n + 1` bytes, for `n` in `0..8`.
const VARINT_SIZE_LIMITS: [u64; 8] = [
    127,
    16_383,
    2_097_151,
    268_435_455,
    34_359_738_367,
    4_398_046_511_103,
    562_949_953_421_311,
    72_057_594_037_927_935,
];

/// Read a varint from the front of a buffer, advancing past it.
///
/// Varints are a variable-length encoding for integers used by SQLite.
/// They use 1-9 bytes depending on the magnitude of the value: the first
/// eight bytes contribute their low 7 bits while the high bit is set, and a
/// ninth byte contributes all 8 bits.
///
/// # Arguments
///
/// * `buf` - The buffer positioned at the start of the varint
///
/// # Returns
///
/// Returns a tuple of (value, number of bytes read). If the buffer runs out
/// before the varint terminates, the error's offset is relative to where
/// decoding began.
pub fn decode_varint<B: Buf>(buf: &mut B) -> Result<(u64, usize)> {
    let mut value: u64 = 0;

    for i in 0..VARINT_MAX_BYTES - 1 {
        let byte = next_byte(buf, i)?;
        // Use lower 7 bits, stop once the high bit is clear
        value = (value << 7) | (byte & VARINT_DATA_MASK) as u64;
        if byte & VARINT_CONTINUATION_BIT == 0 {
            return Ok((value, i + 1));
        }
    }

    // 9th byte uses all 8 bits
    let byte = next_byte(buf, VARINT_MAX_BYTES - 1)?;
    Ok(((value << 8) | byte as u64, VARINT_MAX_BYTES))
}

fn next_byte<B: Buf>(buf: &mut B, consumed: usize) -> Result<u8> {
    if !buf.has_remaining() {
        return Err(DecodeError::TruncatedVarint {
            offset: 0,
            consumed,
        });
    }
    Ok(buf.get_u8())
}

/// Number of bytes the varint encoding of `value` occupies.
pub fn encoded_size(value: u64) -> usize {
    VARINT_SIZE_LIMITS
        .iter()
        .position(|&limit| value <= limit)
        .map_or(VARINT_MAX_BYTES, |i| i + 1)
}
