//! Error types for the DPoVP engine

use shared_crypto::CryptoError;
use shared_types::{Address, Hash};
use std::fmt;

/// Which turn rule a header broke.
///
/// The numeric codes are stable and appear in logs as "not turn -N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfTurn {
    /// Single signer network, block came before the minimum interval elapsed.
    NotEnoughSleep,
    /// Producer of the parent signed again outside its end-of-round window.
    RepeatedProducer,
    /// Next-in-line producer signed outside `[min interval, timeout)`.
    OutsideFirstWindow,
    /// Next-in-line producer signed outside its window after a full round.
    OutsideWrappedWindow,
    /// Later producer signed outside the window its slot distance assigns.
    WrongSlot,
}

impl OutOfTurn {
    /// Stable numeric code.
    pub fn code(&self) -> i8 {
        match self {
            OutOfTurn::NotEnoughSleep => -1,
            OutOfTurn::RepeatedProducer => -2,
            OutOfTurn::OutsideFirstWindow => -3,
            OutOfTurn::OutsideWrappedWindow => -4,
            OutOfTurn::WrongSlot => -5,
        }
    }
}

impl fmt::Display for OutOfTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfTurn::NotEnoughSleep => write!(f, "only one signer, but not enough sleep time {}", self.code()),
            _ => write!(f, "not turn to produce block {}", self.code()),
        }
    }
}

/// Consensus error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("Invalid block number: genesis has no parent to verify against")]
    InvalidNumber,

    #[error("Unknown ancestor {parent_hash:?} at height {number}")]
    MissingAncestor { parent_hash: Hash, number: u64 },

    #[error("Block from the future: timestamp {timestamp}, current is {now}")]
    FutureTimestamp { timestamp: u64, now: u64 },

    #[error("Block timestamp {timestamp} precedes parent timestamp {parent}")]
    TimestampBeforeParent { timestamp: u64, parent: u64 },

    #[error("Wrong signature info: {0}")]
    SignatureRecoveryFailure(CryptoError),

    #[error("Can't get pubkey of {0:?}: not a roster member")]
    UnknownSigner(Address),

    #[error("Can't verify block's signer: signature does not match roster key of {0:?}")]
    SignerMismatch(Address),

    #[error("{0}")]
    OutOfTurn(OutOfTurn),

    #[error("Not an authorized signer: {0:?}")]
    NotAuthorized(Address),

    #[error("Uncles not allowed: block carries {0}")]
    UnclesNotAllowed(usize),

    #[error("Sealing the genesis block is not supported")]
    SealGenesis,

    #[error("Seal signer {signer:?} != coinbase {coinbase:?}")]
    SealMismatch { coinbase: Address, signer: Address },

    #[error("No signing key configured")]
    MissingSigningKey,

    #[error("Signing key address {key:?} != coinbase {coinbase:?}")]
    SigningKeyMismatch { coinbase: Address, key: Address },

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No tokio runtime available to drive the turn timer")]
    NoRuntime,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Verification worker failed: {0}")]
    WorkerFailed(String),
}

impl ConsensusError {
    /// Whether the same header may pass later without changing.
    ///
    /// Only a future timestamp heals by itself once the local clock catches
    /// up; everything else is a permanent reject.
    pub fn is_temporary(&self) -> bool {
        matches!(self, ConsensusError::FutureTimestamp { .. })
    }

    /// Short stable label, used as the metrics `reason` label.
    pub fn reason(&self) -> &'static str {
        match self {
            ConsensusError::InvalidNumber => "invalid_number",
            ConsensusError::MissingAncestor { .. } => "missing_ancestor",
            ConsensusError::FutureTimestamp { .. } => "future_timestamp",
            ConsensusError::TimestampBeforeParent { .. } => "timestamp_before_parent",
            ConsensusError::SignatureRecoveryFailure(_) => "signature_recovery",
            ConsensusError::UnknownSigner(_) => "unknown_signer",
            ConsensusError::SignerMismatch(_) => "signer_mismatch",
            ConsensusError::OutOfTurn(_) => "out_of_turn",
            ConsensusError::NotAuthorized(_) => "not_authorized",
            ConsensusError::UnclesNotAllowed(_) => "uncles",
            ConsensusError::SealGenesis => "seal_genesis",
            ConsensusError::SealMismatch { .. } => "seal_mismatch",
            ConsensusError::MissingSigningKey => "missing_signing_key",
            ConsensusError::SigningKeyMismatch { .. } => "signing_key_mismatch",
            ConsensusError::InvalidRoster(_) => "invalid_roster",
            ConsensusError::InvalidConfig(_) => "invalid_config",
            ConsensusError::NoRuntime => "no_runtime",
            ConsensusError::Crypto(_) => "crypto",
            ConsensusError::WorkerFailed(_) => "worker_failed",
        }
    }
}

impl From<OutOfTurn> for ConsensusError {
    fn from(reason: OutOfTurn) -> Self {
        ConsensusError::OutOfTurn(reason)
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
