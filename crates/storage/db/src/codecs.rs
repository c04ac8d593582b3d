//! Fixed-width value codecs shared by watermark, sequence and block-number tables.

use crate::{DatabaseError, Tables};

/// Encodes a counter or block number.
pub const fn encode_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes a counter or block number read from `table`.
pub fn decode_u64(table: Tables, value: &[u8]) -> Result<u64, DatabaseError> {
    value.try_into().map(u64::from_be_bytes).map_err(|_| DatabaseError::Decode { table })
}
