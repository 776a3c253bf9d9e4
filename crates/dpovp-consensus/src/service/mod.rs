//! DPoVP engine service
//!
//! # Architecture
//! - Roster, coinbase and signing key live behind their own `RwLock`s and
//!   are snapshotted at the start of every operation
//! - The turn flag and its pending wake-up live in the [`TurnTimer`], whose
//!   lock `seal` holds for its whole body
//! - Collaborators (chain, state, clock) are injected through ports and
//!   never called with the turn lock held

mod verify;

use crate::domain::{
    accumulate_rewards, plan_turn, ConsensusError, ConsensusResult, DpovpConfig, TurnPlan,
};
use crate::metrics;
use crate::ports::{
    ApiDescriptor, ChainReader, ConsensusEngine, HeaderBatch, SignerDirectory, StateAccessor,
    SystemTimeSource, TimeSource,
};
use crate::timer::TurnTimer;
use parking_lot::RwLock;
use shared_crypto::{recover_address, Secp256k1KeyPair};
use shared_types::{
    calc_uncle_hash, Address, Block, BlockHeader, Receipt, Transaction, U256, ZERO_HASH,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use verify::HeaderVerifier;

/// Returns the node's current chain head.
pub type HeadAccessor = Arc<dyn Fn() -> BlockHeader + Send + Sync>;

/// Dependencies for DpovpEngine
pub struct EngineDependencies {
    pub config: DpovpConfig,
    pub roster: Arc<dyn SignerDirectory>,
    pub coinbase: Address,
    pub current_head: HeadAccessor,
}

/// Snapshot of the engine's operator-visible state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineStatus {
    pub coinbase: Address,
    pub signers: usize,
    pub is_turn: bool,
    pub next_wake_up: Option<Duration>,
}

/// Round-robin DPoVP consensus engine.
pub struct DpovpEngine {
    config: DpovpConfig,
    roster: RwLock<Arc<dyn SignerDirectory>>,
    coinbase: RwLock<Address>,
    signer: RwLock<Option<Arc<Secp256k1KeyPair>>>,
    current_head: HeadAccessor,
    timer: TurnTimer,
    runtime: Handle,
    time_source: Arc<dyn TimeSource>,
}

impl DpovpEngine {
    /// Create the engine on the current tokio runtime.
    pub fn new(deps: EngineDependencies) -> ConsensusResult<Self> {
        deps.config.validate()?;
        check_roster(deps.roster.as_ref())?;
        let runtime = Handle::try_current().map_err(|_| ConsensusError::NoRuntime)?;

        info!(
            signers = deps.roster.count(),
            timeout_ms = deps.config.timeout_ms,
            block_interval_ms = deps.config.block_interval_ms,
            coinbase = ?deps.coinbase,
            "DPoVP engine initialized"
        );

        Ok(Self {
            config: deps.config,
            roster: RwLock::new(deps.roster),
            coinbase: RwLock::new(deps.coinbase),
            signer: RwLock::new(None),
            current_head: deps.current_head,
            timer: TurnTimer::new(runtime.clone()),
            runtime,
            time_source: Arc::new(SystemTimeSource),
        })
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Box<dyn TimeSource>) -> Self {
        self.time_source = Arc::from(time_source);
        self
    }

    pub fn config(&self) -> &DpovpConfig {
        &self.config
    }

    // === OPERATOR SURFACE ===

    /// Change the identity this node seals as.
    pub fn set_coinbase(&self, coinbase: Address) {
        *self.coinbase.write() = coinbase;
        info!(coinbase = ?coinbase, "Coinbase updated");
    }

    pub fn coinbase(&self) -> Address {
        *self.coinbase.read()
    }

    /// Install the key used to sign sealed blocks.
    pub fn authorize(&self, key: Secp256k1KeyPair) {
        let address = key.address();
        *self.signer.write() = Some(Arc::new(key));
        info!(signer = ?address, "Signing key authorized");
    }

    /// Switch to a new epoch's roster.
    pub fn set_roster(&self, roster: Arc<dyn SignerDirectory>) -> ConsensusResult<()> {
        check_roster(roster.as_ref())?;
        let signers = roster.count();
        *self.roster.write() = roster;
        info!(signers, "Signer roster replaced");
        Ok(())
    }

    pub fn roster(&self) -> Arc<dyn SignerDirectory> {
        Arc::clone(&self.roster.read())
    }

    /// Recompute when this node's next sealing window opens and arm the
    /// turn timer accordingly. Call on every new head and periodically.
    pub fn modify_timer(&self) -> TurnPlan {
        let head = (self.current_head)();
        let coinbase = self.coinbase();
        let roster = self.roster();
        let now = self.time_source.now();

        let plan = plan_turn(now, &head, &coinbase, roster.as_ref(), &self.config);
        match plan {
            TurnPlan::OpenNow => self.timer.open_now(),
            TurnPlan::WaitFor(delay_ms) => self.timer.rearm(delay_ms),
            TurnPlan::Keep => {}
        }

        debug!(head = head.number, coinbase = ?coinbase, plan = ?plan, "Turn timer updated");
        plan
    }

    pub fn is_turn(&self) -> bool {
        self.timer.is_turn()
    }

    /// Time until the pending wake-up fires.
    pub fn next_wake_up(&self) -> Option<Duration> {
        self.timer
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(tokio::time::Instant::now()))
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            coinbase: self.coinbase(),
            signers: self.roster().count(),
            is_turn: self.is_turn(),
            next_wake_up: self.next_wake_up(),
        }
    }

    fn header_verifier(&self) -> HeaderVerifier {
        HeaderVerifier {
            config: self.config.clone(),
            roster: self.roster(),
            current_head: Arc::clone(&self.current_head),
            time_source: Arc::clone(&self.time_source),
        }
    }

    fn signing_key(&self, coinbase: &Address) -> ConsensusResult<Arc<Secp256k1KeyPair>> {
        let key = self
            .signer
            .read()
            .clone()
            .ok_or(ConsensusError::MissingSigningKey)?;
        let address = key.address();
        if address != *coinbase {
            return Err(ConsensusError::SigningKeyMismatch {
                coinbase: *coinbase,
                key: address,
            });
        }
        Ok(key)
    }
}

fn check_roster(roster: &dyn SignerDirectory) -> ConsensusResult<()> {
    if roster.count() == 0 {
        return Err(ConsensusError::InvalidRoster("roster is empty".into()));
    }
    Ok(())
}

impl ConsensusEngine for DpovpEngine {
    fn author(&self, header: &BlockHeader) -> ConsensusResult<Address> {
        Ok(header.coinbase)
    }

    fn verify_header(&self, chain: &dyn ChainReader, header: &BlockHeader) -> ConsensusResult<()> {
        self.header_verifier().verify(chain, header, &[])
    }

    fn verify_headers(&self, chain: Arc<dyn ChainReader>, headers: Vec<BlockHeader>) -> HeaderBatch {
        verify::spawn_batch(&self.runtime, self.header_verifier(), chain, headers)
    }

    fn verify_uncles(&self, _chain: &dyn ChainReader, block: &Block) -> ConsensusResult<()> {
        if !block.uncles.is_empty() {
            return Err(ConsensusError::UnclesNotAllowed(block.uncles.len()));
        }
        Ok(())
    }

    fn verify_seal(&self, _chain: &dyn ChainReader, header: &BlockHeader) -> ConsensusResult<()> {
        let signer = recover_address(&header.seal_hash(), &header.signature)
            .map_err(ConsensusError::SignatureRecoveryFailure)?;
        if signer != header.coinbase {
            return Err(ConsensusError::SealMismatch {
                coinbase: header.coinbase,
                signer,
            });
        }
        Ok(())
    }

    fn prepare(&self, chain: &dyn ChainReader, header: &mut BlockHeader) -> ConsensusResult<()> {
        let missing = ConsensusError::MissingAncestor {
            parent_hash: header.parent_hash,
            number: header.number,
        };
        let parent_number = header.number.checked_sub(1).ok_or(missing.clone())?;
        if chain.get_header(&header.parent_hash, parent_number).is_none() {
            return Err(missing);
        }

        header.nonce = [0u8; 8];
        header.mix_digest = ZERO_HASH;
        header.difficulty = U256::one();
        header.timestamp = self.time_source.now();
        Ok(())
    }

    fn finalize(
        &self,
        chain: &dyn ChainReader,
        mut header: BlockHeader,
        state: &dyn StateAccessor,
        transactions: Vec<Transaction>,
        _uncles: Vec<BlockHeader>,
        receipts: &[Receipt],
    ) -> ConsensusResult<Block> {
        accumulate_rewards(state, &header);
        header.state_root = state.intermediate_root(chain.config().is_eip158(header.number));
        header.uncle_hash = calc_uncle_hash(&[]);

        Ok(Block::new(header, transactions, Vec::new(), receipts))
    }

    fn seal(&self, _chain: &dyn ChainReader, block: Block) -> ConsensusResult<Option<Block>> {
        let coinbase = self.coinbase();
        let roster = self.roster();
        let mut turn = self.timer.lock();

        if roster.index_of(&coinbase).is_none() {
            warn!(coinbase = ?coinbase, "Refusing to seal: coinbase is not a roster member");
            return Err(ConsensusError::NotAuthorized(coinbase));
        }
        let key = self.signing_key(&coinbase)?;

        if !turn.consume() {
            return Ok(None);
        }

        let signers = roster.count();
        let delay_ms = if signers > 1 {
            (signers as u64 - 1).saturating_mul(self.config.timeout_ms)
        } else {
            self.config.block_interval_ms
        };
        turn.rearm(delay_ms);

        let mut header = block.header.clone();
        if header.is_genesis() {
            return Err(ConsensusError::SealGenesis);
        }

        let signature = key.sign_prehash(&header.seal_hash())?;
        header.signature = signature.to_vec();
        drop(turn);

        metrics::record_block_sealed();
        info!(
            number = header.number,
            hash = ?header.hash(),
            coinbase = ?coinbase,
            next_turn_ms = delay_ms,
            "Sealed block"
        );
        Ok(Some(block.with_seal(header)))
    }

    fn calc_difficulty(&self, _chain: &dyn ChainReader, _time: u64, _parent: &BlockHeader) -> U256 {
        U256::one()
    }

    fn apis(&self, _chain: &dyn ChainReader) -> Vec<ApiDescriptor> {
        Vec::new()
    }
}
