use crate::{B256, U256};

/// Incarnation assigned to an account that is created with code or storage.
pub const FIRST_CONTRACT_INCARNATION: u64 = 1;

const NONCE_LEN: usize = 8;
const BALANCE_LEN: usize = 32;
const INCARNATION_LEN: usize = 8;
const HASH_LEN: usize = 32;

/// Fixed part of the encoding: nonce, balance, incarnation and the code hash flag.
const BASE_LEN: usize = NONCE_LEN + BALANCE_LEN + INCARNATION_LEN + 1;

/// Account saved in the plain state table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Account {
    /// Nonce.
    pub nonce: u64,
    /// Account balance.
    pub balance: U256,
    /// Incarnation of the contract storage. Zero for externally owned accounts.
    pub incarnation: u64,
    /// Hash of the bytecode.
    pub code_hash: Option<B256>,
}

/// Returned when a stored account cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid account encoding of {len} bytes")]
pub struct AccountDecodeError {
    /// Length of the rejected buffer.
    pub len: usize,
}

impl Account {
    /// Does account has a bytecode.
    pub const fn has_bytecode(&self) -> bool {
        self.code_hash.is_some()
    }

    /// Encodes the account into its storage layout:
    /// `nonce (8) | balance (32) | incarnation (8) | has_code (1) | code_hash (32)?`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(BASE_LEN + HASH_LEN);
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        buf.extend_from_slice(&self.balance.to_be_bytes::<BALANCE_LEN>());
        buf.extend_from_slice(&self.incarnation.to_be_bytes());
        match self.code_hash {
            Some(hash) => {
                buf.push(1);
                buf.extend_from_slice(hash.as_slice());
            }
            None => buf.push(0),
        }
        buf
    }

    /// Decodes an account previously written with [`Account::encode`].
    pub fn decode(buf: &[u8]) -> Result<Self, AccountDecodeError> {
        let err = AccountDecodeError { len: buf.len() };
        if buf.len() < BASE_LEN {
            return Err(err)
        }

        let (nonce, rest) = buf.split_at(NONCE_LEN);
        let (balance, rest) = rest.split_at(BALANCE_LEN);
        let (incarnation, rest) = rest.split_at(INCARNATION_LEN);

        let code_hash = match (rest[0], &rest[1..]) {
            (0, []) => None,
            (1, hash) if hash.len() == HASH_LEN => Some(B256::from_slice(hash)),
            _ => return Err(err),
        };

        Ok(Self {
            nonce: u64::from_be_bytes(nonce.try_into().map_err(|_| err)?),
            balance: U256::from_be_slice(balance),
            incarnation: u64::from_be_bytes(incarnation.try_into().map_err(|_| err)?),
            code_hash,
        })
    }
}
