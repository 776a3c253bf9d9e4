//! In-memory account balances

use crate::ports::StateAccessor;
use parking_lot::RwLock;
use shared_crypto::Keccak256Hasher;
use shared_types::{Address, Hash, U256};
use std::collections::BTreeMap;

/// Balance map with a deterministic root.
///
/// The root is Keccak-256 over `address || balance` for every account in
/// address order. Under EIP-158 zero-balance accounts are left out.
#[derive(Debug, Default)]
pub struct InMemoryState {
    balances: RwLock<BTreeMap<Address, U256>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, address: &Address) -> U256 {
        self.balances
            .read()
            .get(address)
            .copied()
            .unwrap_or_default()
    }

    /// Create or overwrite an account.
    pub fn set_balance(&self, address: Address, amount: U256) {
        self.balances.write().insert(address, amount);
    }
}

impl StateAccessor for InMemoryState {
    fn add_balance(&self, address: &Address, amount: U256) {
        let mut balances = self.balances.write();
        let entry = balances.entry(*address).or_default();
        *entry = entry.saturating_add(amount);
    }

    fn intermediate_root(&self, eip158: bool) -> Hash {
        let balances = self.balances.read();
        let mut hasher = Keccak256Hasher::new();
        for (address, balance) in balances.iter() {
            if eip158 && balance.is_zero() {
                continue;
            }
            let mut amount = [0u8; 32];
            balance.to_big_endian(&mut amount);
            hasher.update(address).update(&amount);
        }
        hasher.finalize()
    }
}
