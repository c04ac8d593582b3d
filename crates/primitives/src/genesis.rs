//! Types for genesis configuration of a chain.

// re-export genesis types
#[doc(inline)]
pub use alloy_genesis::{Genesis, GenesisAccount};

use crate::{address, U256};

/// Name of the built-in development chain.
pub const DEV_CHAIN: &str = "dev";

/// Returns the genesis of the built-in development chain: a single prefunded account.
pub fn dev_genesis() -> Genesis {
    let balance = U256::from(10u64).pow(U256::from(22u64));
    Genesis::default().extend_accounts([(
        address!("67b1d87101671b127f5f8714789c7192f7ad340e"),
        GenesisAccount::default().with_balance(balance),
    )])
}
