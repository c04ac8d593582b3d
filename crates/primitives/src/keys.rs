//! Key layouts shared by block-keyed and state tables.
//!
//! Block numbers are encoded big-endian so that the byte order of keys matches the numeric order
//! of blocks.

use crate::{Address, BlockNumber, B256};

/// Length of an encoded block number.
pub const BLOCK_NUMBER_LEN: usize = 8;

/// Key under which the head header hash is stored.
pub const HEAD_HEADER_KEY: &[u8] = b"LastHeader";

/// Encodes a block number as a table key.
pub const fn encode_block_number(number: BlockNumber) -> [u8; BLOCK_NUMBER_LEN] {
    number.to_be_bytes()
}

/// Encodes a `number ‖ hash` key, used by tables that may hold several blocks per height.
pub fn block_hash_key(number: BlockNumber, hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(BLOCK_NUMBER_LEN + 32);
    key.extend_from_slice(&encode_block_number(number));
    key.extend_from_slice(hash.as_slice());
    key
}

/// Decodes the block number prefix of a block-keyed table key.
pub fn decode_block_number(key: &[u8]) -> Option<BlockNumber> {
    let prefix = key.get(..BLOCK_NUMBER_LEN)?;
    Some(BlockNumber::from_be_bytes(prefix.try_into().ok()?))
}

/// Plain contract code key: `address ‖ incarnation`.
pub fn contract_code_key(address: Address, incarnation: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(20 + 8);
    key.extend_from_slice(address.as_slice());
    key.extend_from_slice(&incarnation.to_be_bytes());
    key
}

/// Plain storage key: `address ‖ incarnation ‖ slot`.
pub fn plain_storage_key(address: Address, incarnation: u64, slot: B256) -> Vec<u8> {
    let mut key = contract_code_key(address, incarnation);
    key.extend_from_slice(slot.as_slice());
    key
}
