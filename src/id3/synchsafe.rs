// Synchsafe integers: 28 bits spread over 4 bytes, 7 bits per byte

use crate::error::{Id3Error, Result};

/// Largest value a 4-byte synchsafe integer can hold (2^28 - 1)
pub const SYNCHSAFE_MAX: u32 = 0x0FFF_FFFF;

/// Decode a synchsafe integer.
///
/// Fails with `MalformedSize` if any byte has its top bit set.
pub fn decode_synchsafe(bytes: [u8; 4]) -> Result<u32> {
    if bytes.iter().any(|&b| b & 0x80 != 0) {
        return Err(Id3Error::MalformedSize(bytes));
    }

    Ok(((bytes[0] as u32) << 21)
        | ((bytes[1] as u32) << 14)
        | ((bytes[2] as u32) << 7)
        | (bytes[3] as u32))
}

/// Encode a value as a synchsafe integer.
///
/// Fails with `ValueTooLarge` above [`SYNCHSAFE_MAX`].
pub fn encode_synchsafe(value: u32) -> Result<[u8; 4]> {
    if value > SYNCHSAFE_MAX {
        return Err(Id3Error::ValueTooLarge(value as u64));
    }

    Ok([
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ])
}
