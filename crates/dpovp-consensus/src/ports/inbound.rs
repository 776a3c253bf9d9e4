//! Driving ports (Inbound API)

use super::outbound::{ChainReader, StateAccessor};
use crate::domain::ConsensusResult;
use shared_types::{Address, Block, BlockHeader, Receipt, Transaction, U256};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// RPC namespace contributed by an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiDescriptor {
    pub namespace: String,
    pub version: String,
    pub public: bool,
}

/// Cancels a running batch verification.
///
/// Dropping the handle leaves the batch running to completion.
#[derive(Debug)]
pub struct VerifyAbort(watch::Sender<bool>);

impl VerifyAbort {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self(tx), rx)
    }

    /// Stop forwarding results. Workers already running finish in the
    /// background and their results are discarded.
    pub fn abort(&self) {
        let _ = self.0.send(true);
    }
}

/// Results of [`ConsensusEngine::verify_headers`], one per input header in
/// input order.
pub struct HeaderBatch {
    pub abort: VerifyAbort,
    pub results: mpsc::Receiver<ConsensusResult<()>>,
}

/// Consensus engine interface the host node drives.
///
/// Mirrors the engine contract of account-based chains: the miner calls
/// `prepare`, `finalize` and `seal`; the import pipeline calls the
/// `verify_*` family.
pub trait ConsensusEngine: Send + Sync {
    /// Address of the account that sealed `header`.
    fn author(&self, header: &BlockHeader) -> ConsensusResult<Address>;

    /// Check a header against the turn schedule and its signature.
    fn verify_header(&self, chain: &dyn ChainReader, header: &BlockHeader) -> ConsensusResult<()>;

    /// Verify an ordered batch concurrently. Each header may use the headers
    /// before it in `headers` as ancestors.
    fn verify_headers(
        &self,
        chain: Arc<dyn ChainReader>,
        headers: Vec<BlockHeader>,
    ) -> HeaderBatch;

    /// Reject blocks carrying uncles.
    fn verify_uncles(&self, chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()>;

    /// Check the signature recovers to the header's coinbase.
    fn verify_seal(&self, chain: &dyn ChainReader, header: &BlockHeader) -> ConsensusResult<()>;

    /// Fill the consensus fields of a header about to be built.
    fn prepare(&self, chain: &dyn ChainReader, header: &mut BlockHeader) -> ConsensusResult<()>;

    /// Apply block rewards, set the state root and assemble the block.
    fn finalize(
        &self,
        chain: &dyn ChainReader,
        header: BlockHeader,
        state: &dyn StateAccessor,
        transactions: Vec<Transaction>,
        uncles: Vec<BlockHeader>,
        receipts: &[Receipt],
    ) -> ConsensusResult<Block>;

    /// Sign the block if it is this node's turn.
    ///
    /// Returns `Ok(None)` when the turn window is not open; never blocks.
    fn seal(&self, chain: &dyn ChainReader, block: Block) -> ConsensusResult<Option<Block>>;

    /// Difficulty of a block built on `parent` at `time`.
    fn calc_difficulty(&self, chain: &dyn ChainReader, time: u64, parent: &BlockHeader) -> U256;

    /// RPC namespaces this engine serves.
    fn apis(&self, chain: &dyn ChainReader) -> Vec<ApiDescriptor>;
}
