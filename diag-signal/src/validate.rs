use crate::database::InternalDatabase;
use crate::types::ByteOrder;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("duplicate DID identifier 0x{0:04X} ('{1}')")]
    DuplicateIdentifier(u32, String),
    #[error("duplicate data name '{0}' in DID '{1}'")]
    DuplicateDataName(String, String),
    #[error("data '{data}' in DID '{did}' ends at bit {end_bit}, beyond the DID length of {length} bytes")]
    DataOutOfBounds {
        did: String,
        data: String,
        end_bit: u32,
        length: u32,
    },
}

/// Validate an InternalDatabase for structural consistency.
pub fn validate_database(db: &InternalDatabase) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut identifiers = HashSet::new();
    let mut names = HashSet::new();
    for did in &db.dids {
        if !identifiers.insert(did.identifier) {
            errors.push(ValidationError::DuplicateIdentifier(
                did.identifier,
                did.name.clone(),
            ));
        }

        // Same name under different identifiers (warn via log, not an error)
        if !names.insert(did.name.as_str()) {
            log::warn!("DID name '{}' is used more than once", did.name);
        }

        let mut data_names = HashSet::new();
        for data in &did.datas {
            if !data_names.insert(data.name()) {
                errors.push(ValidationError::DuplicateDataName(
                    data.name().to_string(),
                    did.name.clone(),
                ));
            }

            let end = end_bit(data.start(), data.length(), data.byte_order());
            if u64::from(end) > u64::from(did.length) * 8 {
                errors.push(ValidationError::DataOutOfBounds {
                    did: did.name.clone(),
                    data: data.name().to_string(),
                    end_bit: end,
                    length: did.length,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Exclusive end of a field in bits from the start of the payload, saturating
/// at `u32::MAX`. Big endian fields are counted MSB-first from their start
/// byte, so the unused high bits of that byte come before the field.
fn end_bit(start: u32, length: u32, byte_order: ByteOrder) -> u32 {
    match byte_order {
        ByteOrder::LittleEndian => start.saturating_add(length),
        ByteOrder::BigEndian => (8 * (start / 8) + (7 - start % 8)).saturating_add(length),
    }
}
