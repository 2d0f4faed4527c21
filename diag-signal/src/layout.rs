//! Bit-layout normalization.
//!
//! Every ingestion path locates signals with the DBC start-bit convention:
//! bit `n` is bit `n % 8` (LSB = 0) of byte `n / 8`. Little endian signals are
//! addressed by their least significant bit; big endian signals by their most
//! significant bit, continuing at bit 7 of the next byte ("sawtooth"):
//!
//! ```text
//! Byte:       0        1        2
//!        +--------+--------+--------+
//! Bit:    7      0 15     8 23    16
//! ```

use crate::types::ByteOrder;

/// Convert a CDD (C-style, consecutive from offset 0) field bit offset into a
/// DBC start bit.
///
/// The bit position inside a byte, `cdd_offset % 8`, is counted from the
/// least significant bit. A big endian field occupies bits
/// `cdd_offset % 8 ..` of its first byte and its MSB sits at the highest of
/// them, capped at bit 7. Sub-byte big endian fields therefore start from the
/// low end of the byte, not from bit 7 downwards.
///
/// Total over all inputs; the start bit never moves past bit 7 of the byte
/// containing `cdd_offset`.
pub fn cdd_offset_to_dbc_start_bit(cdd_offset: u32, bit_length: u32, byte_order: ByteOrder) -> u32 {
    match byte_order {
        ByteOrder::LittleEndian => cdd_offset,
        ByteOrder::BigEndian => {
            let msb_in_byte = (cdd_offset % 8).saturating_add(bit_length).saturating_sub(1).min(7);
            8 * (cdd_offset / 8) + msb_in_byte
        }
    }
}
