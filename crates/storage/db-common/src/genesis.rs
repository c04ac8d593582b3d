//! Genesis definitions by chain name, and the reseed of genesis state into the state tables.

use crate::ResetError;
use std::{collections::HashMap, fmt, fs, path::Path, sync::Arc};
use syncreset_config::ResetConfig;
use syncreset_db::{DatabaseError, DbTxMut, Tables};
use syncreset_primitives::{
    genesis::{dev_genesis, DEV_CHAIN},
    keccak256,
    keys::{contract_code_key, plain_storage_key},
    Account, Genesis, FIRST_CONTRACT_INCARNATION,
};
use tracing::{debug, info};

/// Resolves a chain name to its genesis definition.
pub trait GenesisProvider: Send + Sync + fmt::Debug {
    /// Returns the genesis of `chain`.
    fn genesis(&self, chain: &str) -> Result<Arc<Genesis>, ResetError>;
}

/// Genesis definitions known by name.
///
/// Always contains the built-in [`DEV_CHAIN`].
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<String, Arc<Genesis>>,
}

impl ChainRegistry {
    /// Creates the default registry extended with the genesis files of
    /// [`ResetConfig::genesis_dir`], if configured.
    pub fn from_config(config: &ResetConfig) -> Result<Self, ResetError> {
        match &config.genesis_dir {
            Some(dir) => Self::default().load_dir(dir),
            None => Ok(Self::default()),
        }
    }

    /// Registers `genesis` under `chain`, replacing an existing definition.
    pub fn with_chain(mut self, chain: impl Into<String>, genesis: Genesis) -> Self {
        self.chains.insert(chain.into(), Arc::new(genesis));
        self
    }

    /// Registers every `<chain>.json` file in `dir`, in geth genesis format.
    pub fn load_dir(mut self, dir: &Path) -> Result<Self, ResetError> {
        let io_err = |source: std::io::Error| ResetError::Io { path: dir.to_path_buf(), source };

        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue
            }
            let Some(chain) = path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string)
            else {
                continue
            };

            let raw = fs::read_to_string(&path)
                .map_err(|source| ResetError::Io { path: path.clone(), source })?;
            let genesis: Genesis = serde_json::from_str(&raw).map_err(|err| {
                ResetError::InvalidGenesis { chain: chain.clone(), message: err.to_string() }
            })?;

            let accounts = genesis.alloc.len();
            debug!(target: "reset::genesis", %chain, accounts, "Loaded genesis");
            self.chains.insert(chain, Arc::new(genesis));
        }
        Ok(self)
    }

    /// Names of the registered chains, sorted.
    pub fn chains(&self) -> Vec<&str> {
        let mut names = self.chains.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self { chains: HashMap::from([(DEV_CHAIN.to_string(), Arc::new(dev_genesis()))]) }
    }
}

impl GenesisProvider for ChainRegistry {
    fn genesis(&self, chain: &str) -> Result<Arc<Genesis>, ResetError> {
        self.chains
            .get(chain)
            .cloned()
            .ok_or_else(|| ResetError::UnknownGenesis { chain: chain.to_string() })
    }
}

/// Inserts the genesis allocation into the plain state tables.
///
/// Accounts with code or storage get [`FIRST_CONTRACT_INCARNATION`]. Zero storage values are
/// skipped and stored values have their leading zero bytes stripped. Only tables of the state
/// group are written.
pub fn insert_genesis_state<TX>(tx: &TX, genesis: &Genesis) -> Result<(), DatabaseError>
where
    TX: DbTxMut + ?Sized,
{
    let mut contracts = 0usize;
    let mut slots = 0usize;

    for (address, alloc) in &genesis.alloc {
        let code = alloc.code.as_ref().filter(|code| !code.is_empty());
        let storage = alloc.storage.as_ref().filter(|storage| !storage.is_empty());

        let incarnation =
            if code.is_some() || storage.is_some() { FIRST_CONTRACT_INCARNATION } else { 0 };
        let code_hash = code.map(keccak256);

        let account = Account {
            nonce: alloc.nonce.unwrap_or_default(),
            balance: alloc.balance,
            incarnation,
            code_hash,
        };
        tx.put(Tables::PlainState, address.as_slice(), &account.encode())?;

        if let (Some(code), Some(hash)) = (code, code_hash) {
            tx.put(Tables::Code, hash.as_slice(), code)?;
            tx.put(
                Tables::PlainContractCode,
                &contract_code_key(*address, incarnation),
                hash.as_slice(),
            )?;
            contracts += 1;
        }

        for (slot, value) in storage.into_iter().flatten() {
            let trimmed = trim_leading_zeros(value.as_slice());
            if trimmed.is_empty() {
                continue
            }
            tx.put(Tables::PlainState, &plain_storage_key(*address, incarnation, *slot), trimmed)?;
            slots += 1;
        }
    }

    info!(
        target: "reset::genesis",
        accounts = genesis.alloc.len(),
        contracts,
        slots,
        "Inserted genesis state"
    );
    Ok(())
}

fn trim_leading_zeros(value: &[u8]) -> &[u8] {
    let start = value.iter().position(|byte| *byte != 0).unwrap_or(value.len());
    &value[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;
    use syncreset_db::{test_utils::create_test_rw_db, Database, DbTx};
    use syncreset_primitives::{Address, Bytes, GenesisAccount, B256, U256};

    #[test]
    fn registry_resolves_dev_chain() {
        let registry = ChainRegistry::default();
        assert_eq!(registry.chains(), vec![DEV_CHAIN]);
        assert_eq!(registry.genesis(DEV_CHAIN).unwrap().alloc.len(), 1);
        assert_matches!(
            registry.genesis("mainnet"),
            Err(ResetError::UnknownGenesis { chain }) if chain == "mainnet"
        );
    }

    #[test]
    fn registry_loads_json_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("testnet.json"),
            r#"{
                "config": {},
                "nonce": "0x0",
                "timestamp": "0x0",
                "extraData": "0x",
                "gasLimit": "0x1388",
                "difficulty": "0x1",
                "alloc": { "0x0000000000000000000000000000000000000001": { "balance": "0x1" } }
            }"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a genesis").unwrap();

        let registry = ChainRegistry::default().load_dir(dir.path()).unwrap();
        assert_eq!(registry.chains(), vec!["dev", "testnet"]);
        assert_eq!(registry.genesis("testnet").unwrap().alloc.len(), 1);
    }

    #[test]
    fn registry_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        assert_matches!(
            ChainRegistry::default().load_dir(dir.path()),
            Err(ResetError::InvalidGenesis { chain, .. }) if chain == "broken"
        );
    }

    #[test]
    fn contract_state_layout() {
        let address = Address::with_last_byte(7);
        let code = Bytes::from_static(&[0x60, 0x00]);
        let storage = BTreeMap::from([
            (B256::with_last_byte(1), B256::with_last_byte(0xff)),
            (B256::with_last_byte(2), B256::ZERO),
        ]);
        let genesis = Genesis::default().extend_accounts([(
            address,
            GenesisAccount::default()
                .with_balance(U256::from(5))
                .with_nonce(Some(2))
                .with_code(Some(code.clone()))
                .with_storage(Some(storage)),
        )]);

        let db = create_test_rw_db();
        db.update(|tx| insert_genesis_state(tx, &genesis)).unwrap();

        let tx = db.tx().unwrap();
        let account =
            Account::decode(&tx.get(Tables::PlainState, address.as_slice()).unwrap().unwrap())
                .unwrap();
        let hash = keccak256(&code);
        assert_eq!(
            account,
            Account { nonce: 2, balance: U256::from(5), incarnation: 1, code_hash: Some(hash) }
        );
        assert_eq!(tx.get(Tables::Code, hash.as_slice()), Ok(Some(code.to_vec())));
        assert_eq!(
            tx.get(Tables::PlainContractCode, &contract_code_key(address, 1)),
            Ok(Some(hash.to_vec()))
        );
        assert_eq!(
            tx.get(Tables::PlainState, &plain_storage_key(address, 1, B256::with_last_byte(1))),
            Ok(Some(vec![0xff]))
        );
        // account row plus one non-zero slot
        assert_eq!(tx.entries(Tables::PlainState), Ok(2));
    }
}
