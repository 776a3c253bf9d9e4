//! # Core Chain Entities
//!
//! The host-chain types the consensus engine reads and writes.
//!
//! ## Clusters
//!
//! - **Primitives**: `Hash`, `Address`, `BlockNonce`, `U256`
//! - **Chain**: `BlockHeader`, `Block`, `Transaction`, `Receipt`
//!
//! Header hashing is canonical: every node must derive the same seal hash
//! from the same header, so field order and encoding here are part of the
//! consensus rules.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: PRIMITIVES
// =============================================================================

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Reserved 8-byte nonce field, always zero under DPoVP.
pub type BlockNonce = [u8; 8];

/// The zero address. A header carrying it as coinbase is the genesis block.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The zero hash.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Keccak-256 over the concatenation of `parts`.
fn keccak_concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn u256_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// A block header.
///
/// `signature` is the producer's detached 65-byte recoverable signature
/// (`r || s || v`) over [`BlockHeader::seal_hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// Hash of the uncle list. Always the empty-list hash under DPoVP.
    pub uncle_hash: Hash,
    /// Producer of this block.
    pub coinbase: Address,
    /// State root after applying this block.
    pub state_root: Hash,
    /// Root of the ordered transaction hashes.
    pub transactions_root: Hash,
    /// Root of the ordered receipt hashes.
    pub receipts_root: Hash,
    /// Block difficulty. Always 1 under DPoVP.
    pub difficulty: U256,
    /// Block height.
    pub number: u64,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Gas consumed by the block's transactions.
    pub gas_used: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Free-form producer data.
    pub extra_data: Vec<u8>,
    /// Reserved, zero-filled.
    pub mix_digest: Hash,
    /// Reserved, zero-filled.
    pub nonce: BlockNonce,
    /// Producer signature over the seal hash.
    pub signature: Vec<u8>,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: ZERO_HASH,
            uncle_hash: calc_uncle_hash(&[]),
            coinbase: ZERO_ADDRESS,
            state_root: ZERO_HASH,
            transactions_root: ZERO_HASH,
            receipts_root: ZERO_HASH,
            difficulty: U256::zero(),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Vec::new(),
            mix_digest: ZERO_HASH,
            nonce: [0u8; 8],
            signature: Vec::new(),
        }
    }
}

impl BlockHeader {
    /// Hash of every field except `signature`. This is what the producer
    /// signs and what validators recover the signer from.
    pub fn seal_hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.encode_unsealed(&mut hasher);
        hasher.finalize().into()
    }

    /// Block hash: the seal hash fields plus the signature.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.encode_unsealed(&mut hasher);
        hasher.update((self.signature.len() as u64).to_be_bytes());
        hasher.update(&self.signature);
        hasher.finalize().into()
    }

    fn encode_unsealed(&self, hasher: &mut Keccak256) {
        hasher.update(self.parent_hash);
        hasher.update(self.uncle_hash);
        hasher.update(self.coinbase);
        hasher.update(self.state_root);
        hasher.update(self.transactions_root);
        hasher.update(self.receipts_root);
        hasher.update(u256_bytes(&self.difficulty));
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.gas_limit.to_be_bytes());
        hasher.update(self.gas_used.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update((self.extra_data.len() as u64).to_be_bytes());
        hasher.update(&self.extra_data);
        hasher.update(self.mix_digest);
        hasher.update(self.nonce);
    }

    /// Check if this is the genesis header.
    pub fn is_genesis(&self) -> bool {
        self.number == 0
    }
}

/// A transfer or call submitted by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address.
    pub from: Address,
    /// Recipient address (`None` for contract creation).
    pub to: Option<Address>,
    /// Transferred value in base units.
    pub value: U256,
    /// Sender nonce.
    pub nonce: u64,
    /// Call data.
    pub data: Vec<u8>,
}

impl Transaction {
    /// Compute the transaction hash.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.from);
        match &self.to {
            Some(to) => {
                hasher.update([1u8]);
                hasher.update(to);
            }
            None => hasher.update([0u8]),
        }
        hasher.update(u256_bytes(&self.value));
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(&self.data);
        hasher.finalize().into()
    }
}

/// Execution outcome of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the transaction this receipt belongs to.
    pub tx_hash: Hash,
    /// Whether execution succeeded.
    pub success: bool,
    /// Cumulative gas used in the block up to and including this transaction.
    pub cumulative_gas_used: u64,
}

impl Receipt {
    /// Compute the receipt hash.
    pub fn hash(&self) -> Hash {
        keccak_concat([
            self.tx_hash.as_slice(),
            &[self.success as u8],
            &self.cumulative_gas_used.to_be_bytes(),
        ])
    }
}

/// Root over an ordered list of transactions.
pub fn calc_transactions_root(transactions: &[Transaction]) -> Hash {
    let hashes: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
    keccak_concat(hashes.iter().map(|h| h.as_slice()))
}

/// Root over an ordered list of receipts.
pub fn calc_receipts_root(receipts: &[Receipt]) -> Hash {
    let hashes: Vec<Hash> = receipts.iter().map(Receipt::hash).collect();
    keccak_concat(hashes.iter().map(|h| h.as_slice()))
}

/// Hash of an uncle list. `calc_uncle_hash(&[])` is the empty-uncles hash.
pub fn calc_uncle_hash(uncles: &[BlockHeader]) -> Hash {
    let hashes: Vec<Hash> = uncles.iter().map(BlockHeader::hash).collect();
    keccak_concat(hashes.iter().map(|h| h.as_slice()))
}

/// A block: header plus body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// Ordered transactions.
    pub transactions: Vec<Transaction>,
    /// Uncle headers.
    pub uncles: Vec<BlockHeader>,
}

impl Block {
    /// Assemble a block, deriving the header's transactions root, receipts
    /// root and uncle hash from the body.
    pub fn new(
        mut header: BlockHeader,
        transactions: Vec<Transaction>,
        uncles: Vec<BlockHeader>,
        receipts: &[Receipt],
    ) -> Self {
        header.transactions_root = calc_transactions_root(&transactions);
        header.receipts_root = calc_receipts_root(receipts);
        header.uncle_hash = calc_uncle_hash(&uncles);
        Self {
            header,
            transactions,
            uncles,
        }
    }

    /// Replace the header, keeping the body.
    pub fn with_seal(self, header: BlockHeader) -> Self {
        Self { header, ..self }
    }

    /// Get the hash of this block.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Block height.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}
