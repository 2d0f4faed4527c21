use diag_signal::{ByteOrder, cdd_offset_to_dbc_start_bit};

const PAYLOAD: [u8; 8] = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];

fn payload_bit(data: &[u8], bit: u32) -> u64 {
    u64::from((data[(bit / 8) as usize] >> (bit % 8)) & 1)
}

/// Extract a field addressed by a DBC start bit.
fn dbc_extract(data: &[u8], start: u32, length: u32, byte_order: ByteOrder) -> u64 {
    match byte_order {
        ByteOrder::LittleEndian => (0..length).fold(0, |acc, i| acc | (payload_bit(data, start + i) << i)),
        ByteOrder::BigEndian => {
            let mut value = 0;
            let mut bit = start;
            for _ in 0..length {
                value = (value << 1) | payload_bit(data, bit);
                // sawtooth: after bit 0 of a byte continue at bit 7 of the next
                if bit % 8 == 0 {
                    bit += 15;
                } else {
                    bit -= 1;
                }
            }
            value
        }
    }
}

/// Read `length` bits at a CDD offset, bytes most significant first.
fn direct_big_endian(data: &[u8], offset: u32, length: u32) -> u64 {
    (offset..offset + length).fold(0, |acc, k| {
        let bit = u64::from((data[(k / 8) as usize] >> (7 - k % 8)) & 1);
        (acc << 1) | bit
    })
}

/// Read whole bytes at a byte-aligned CDD offset, least significant first.
fn direct_little_endian(data: &[u8], offset: u32, length: u32) -> u64 {
    let first = (offset / 8) as usize;
    let count = (length / 8) as usize;
    let mut bytes = [0u8; 8];
    bytes[..count].copy_from_slice(&data[first..first + count]);
    u64::from_le_bytes(bytes)
}

#[test]
fn test_first_byte_start_bits() {
    assert_eq!(cdd_offset_to_dbc_start_bit(0, 8, ByteOrder::LittleEndian), 0);
    assert_eq!(cdd_offset_to_dbc_start_bit(0, 8, ByteOrder::BigEndian), 7);
}

#[test]
fn test_big_endian_matches_direct_read() {
    for offset in (0..=32).step_by(8) {
        for length in 8..=32 {
            let start = cdd_offset_to_dbc_start_bit(offset, length, ByteOrder::BigEndian);
            assert_eq!(
                dbc_extract(&PAYLOAD, start, length, ByteOrder::BigEndian),
                direct_big_endian(&PAYLOAD, offset, length),
                "offset {offset}, length {length}, start {start}"
            );
        }
    }
}

#[test]
fn test_little_endian_matches_direct_read() {
    for offset in (0..=32).step_by(8) {
        for length in [8, 16, 24, 32] {
            let start = cdd_offset_to_dbc_start_bit(offset, length, ByteOrder::LittleEndian);
            assert_eq!(
                dbc_extract(&PAYLOAD, start, length, ByteOrder::LittleEndian),
                direct_little_endian(&PAYLOAD, offset, length),
                "offset {offset}, length {length}"
            );
        }
    }
}

#[test]
fn test_sequential_big_endian_fields() {
    // u16 followed by u8, as laid out in a DID
    let first = cdd_offset_to_dbc_start_bit(0, 16, ByteOrder::BigEndian);
    let second = cdd_offset_to_dbc_start_bit(16, 8, ByteOrder::BigEndian);
    assert_eq!((first, second), (7, 23));
    assert_eq!(dbc_extract(&PAYLOAD, first, 16, ByteOrder::BigEndian), 0x1234);
    assert_eq!(dbc_extract(&PAYLOAD, second, 8, ByteOrder::BigEndian), 0x56);
}

#[test]
fn test_small_big_endian_field_stays_in_its_byte() {
    // the in-byte offset counts from the LSB, so (8, 4) ends at bit 11
    // and addresses the low nibble of byte 1
    assert_eq!(cdd_offset_to_dbc_start_bit(8, 4, ByteOrder::BigEndian), 11);
    assert_eq!(cdd_offset_to_dbc_start_bit(12, 4, ByteOrder::BigEndian), 15);
    assert_eq!(cdd_offset_to_dbc_start_bit(13, 1, ByteOrder::BigEndian), 13);
}

#[test]
fn test_start_bit_is_total_for_extreme_inputs() {
    assert_eq!(cdd_offset_to_dbc_start_bit(1, u32::MAX, ByteOrder::BigEndian), 7);
    assert_eq!(cdd_offset_to_dbc_start_bit(9, u32::MAX, ByteOrder::BigEndian), 15);
    assert_eq!(cdd_offset_to_dbc_start_bit(u32::MAX, 1, ByteOrder::BigEndian), u32::MAX);
}
