//! Signer roster
//!
//! The ordered set of authorities allowed to seal blocks during an epoch.
//! Position in the order is the signer's turn slot.

use super::error::{ConsensusError, ConsensusResult};
use crate::ports::SignerDirectory;
use shared_crypto::Secp256k1PublicKey;
use shared_types::Address;
use std::collections::HashMap;

/// One authorized signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignerEntry {
    pub address: Address,
    pub public_key: Secp256k1PublicKey,
}

impl SignerEntry {
    /// Build an entry whose address is derived from the key.
    pub fn from_public_key(public_key: Secp256k1PublicKey) -> Self {
        Self {
            address: public_key.to_address(),
            public_key,
        }
    }
}

/// Immutable, ordered roster with an address index.
#[derive(Clone, Debug)]
pub struct Roster {
    entries: Vec<SignerEntry>,
    lookup: HashMap<Address, usize>,
}

impl Roster {
    /// Create a roster, rejecting empty lists, duplicate addresses and keys
    /// that do not derive to their entry's address.
    pub fn new(entries: Vec<SignerEntry>) -> ConsensusResult<Self> {
        if entries.is_empty() {
            return Err(ConsensusError::InvalidRoster("roster is empty".into()));
        }

        let mut lookup = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.public_key.to_address() != entry.address {
                return Err(ConsensusError::InvalidRoster(format!(
                    "entry {index}: public key does not match address"
                )));
            }
            if lookup.insert(entry.address, index).is_some() {
                return Err(ConsensusError::InvalidRoster(format!(
                    "entry {index}: duplicate address"
                )));
            }
        }

        Ok(Self { entries, lookup })
    }

    /// Create a roster from public keys in turn order.
    pub fn from_public_keys(keys: impl IntoIterator<Item = Secp256k1PublicKey>) -> ConsensusResult<Self> {
        Self::new(keys.into_iter().map(SignerEntry::from_public_key).collect())
    }

    /// Addresses in turn order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.entries.iter().map(|e| &e.address)
    }
}

impl SignerDirectory for Roster {
    fn members(&self) -> &[SignerEntry] {
        &self.entries
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn index_of(&self, address: &Address) -> Option<usize> {
        self.lookup.get(address).copied()
    }

    fn pubkey_of(&self, address: &Address) -> Option<Secp256k1PublicKey> {
        self.index_of(address).map(|idx| self.entries[idx].public_key)
    }
}
