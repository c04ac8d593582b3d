//! Commonly used types for stage reset and recovery.
//!
//! This crate contains the Ethereum primitive types the reset layer stores, together with the
//! byte encodings used for block-keyed tables and plain state.

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/paradigmxyz/reth/main/assets/reth-docs.png",
    html_favicon_url = "https://avatars0.githubusercontent.com/u/97369466?s=256",
    issue_tracker_base_url = "https://github.com/paradigmxyz/reth/issues/"
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod account;
pub mod genesis;
pub mod keys;

pub use account::{Account, AccountDecodeError, FIRST_CONTRACT_INCARNATION};
pub use alloy_primitives::{
    address, b256, keccak256, Address, BlockHash, BlockNumber, Bytes, B256, U256,
};
pub use genesis::{Genesis, GenesisAccount};
