//! Driven ports (Outbound dependencies)
//!
//! Collaborators the engine needs from its host node. All of them are
//! synchronous; the engine never holds its turn lock across a call into one.

use crate::domain::SignerEntry;
use serde::{Deserialize, Serialize};
use shared_crypto::Secp256k1PublicKey;
use shared_types::{Address, BlockHeader, Hash, U256};

/// Chain rules the engine consults while finalizing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Height at which empty accounts stop counting towards the state root.
    pub eip158_block: Option<u64>,
}

impl ChainConfig {
    /// Whether EIP-158 empty-account pruning is active at `number`.
    pub fn is_eip158(&self, number: u64) -> bool {
        self.eip158_block.is_some_and(|fork| number >= fork)
    }
}

/// Read access to the header chain.
pub trait ChainReader: Send + Sync {
    /// Header by hash and height, if known.
    fn get_header(&self, hash: &Hash, number: u64) -> Option<BlockHeader>;

    /// The current canonical head.
    fn current_header(&self) -> BlockHeader;

    /// Chain rules.
    fn config(&self) -> &ChainConfig;
}

/// Ordered roster of authorized signers.
pub trait SignerDirectory: Send + Sync {
    /// All members in turn order.
    fn members(&self) -> &[SignerEntry];

    /// Number of members.
    fn count(&self) -> usize;

    /// Turn slot of `address`, `None` for non-members.
    fn index_of(&self, address: &Address) -> Option<usize>;

    /// Registered public key of `address`.
    fn pubkey_of(&self, address: &Address) -> Option<Secp256k1PublicKey>;
}

/// Mutable account state during block finalization.
pub trait StateAccessor: Send + Sync {
    /// Credit `amount` to `address`.
    fn add_balance(&self, address: &Address, amount: U256);

    /// State root of the pending state.
    fn intermediate_root(&self, eip158: bool) -> Hash;
}

/// Time source for timestamp validation and turn planning
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
