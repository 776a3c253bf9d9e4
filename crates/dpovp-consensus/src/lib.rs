//! # dpovp-consensus
//!
//! Round-robin DPoVP block production for an account-based chain.
//!
//! ## Architecture
//!
//! A fixed, ordered roster of signers takes turns sealing blocks. Each signer
//! owns a `timeout_ms` window per round; the signer after the last producer
//! may seal once `block_interval_ms` has passed, every later signer waits
//! for its own window, and a round that goes by without a block wraps
//! around.
//!
//! ```text
//!   parent ── interval ──┬── window 1 ──┬── window 2 ──┬── ... ── window n ──┐
//!                        │  next signer │  signer + 2  │                     │
//!                        └──────────────┴──────────────┴─── wraps each round ┘
//! ```
//!
//! Producers and validators run the same slot arithmetic
//! ([`domain::plan_turn`] and [`domain::check_turn_window`]), so a block
//! sealed in turn is accepted by every node with the same roster.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dpovp_consensus::{DpovpEngine, EngineDependencies, DpovpConfig, Roster};
//!
//! let engine = DpovpEngine::new(EngineDependencies {
//!     config: DpovpConfig::default(),
//!     roster: Arc::new(Roster::from_public_keys(keys)?),
//!     coinbase: my_key.address(),
//!     current_head: chain.head_accessor(),
//! })?;
//! engine.authorize(my_key);
//!
//! // miner loop
//! engine.modify_timer();
//! if let Some(block) = engine.seal(chain.as_ref(), block)? {
//!     broadcast(block);
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod timer;

// Re-export main types
pub use adapters::{InMemoryChain, InMemoryState, ManualTimeSource};
pub use domain::{
    ConsensusError, ConsensusResult, DpovpConfig, OutOfTurn, Roster, SignerEntry, TurnPlan,
    BLOCK_REWARD,
};
pub use ports::{
    ApiDescriptor, ChainConfig, ChainReader, ConsensusEngine, HeaderBatch, SignerDirectory,
    StateAccessor, SystemTimeSource, TimeSource, VerifyAbort,
};
pub use service::{DpovpEngine, EngineDependencies, EngineStatus, HeadAccessor};
pub use timer::TurnTimer;
