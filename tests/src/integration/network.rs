//! # Test Network
//!
//! A set of DPoVP nodes, one per roster member, each with its own header
//! chain and all reading the same manual clock. Blocks are "gossiped" by
//! handing them to every other node, which verifies and imports them.

use dpovp_consensus::{
    ChainConfig, ChainReader, ConsensusEngine, ConsensusResult, DpovpConfig, DpovpEngine,
    EngineDependencies, InMemoryChain, InMemoryState, ManualTimeSource, Roster,
};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Block, BlockHeader};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. Respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One node: an engine bound to its own chain.
pub struct Node {
    pub engine: DpovpEngine,
    pub chain: Arc<InMemoryChain>,
}

pub struct TestNetwork {
    pub nodes: Vec<Node>,
    pub keys: Vec<Secp256k1KeyPair>,
    pub roster: Arc<Roster>,
    pub clock: ManualTimeSource,
    pub ledger: InMemoryState,
    pub config: DpovpConfig,
}

impl TestNetwork {
    /// Spin up `signers` nodes on a shared genesis. Must run inside a tokio
    /// runtime.
    pub fn new(signers: usize, config: DpovpConfig, start: u64) -> Self {
        init_tracing();

        let keys: Vec<Secp256k1KeyPair> = (0..signers).map(|_| Secp256k1KeyPair::generate()).collect();
        let roster = Arc::new(
            Roster::from_public_keys(keys.iter().map(|k| k.public_key())).expect("valid roster"),
        );
        let clock = ManualTimeSource::new(start);

        let nodes = keys
            .iter()
            .map(|key| {
                let chain = Arc::new(InMemoryChain::new(
                    BlockHeader::default(),
                    ChainConfig {
                        eip158_block: Some(0),
                    },
                ));
                let engine = DpovpEngine::new(EngineDependencies {
                    config: config.clone(),
                    roster: roster.clone(),
                    coinbase: key.address(),
                    current_head: chain.head_accessor(),
                })
                .expect("engine")
                .with_time_source(Box::new(clock.clone()));
                engine.authorize(Secp256k1KeyPair::from_bytes(key.to_bytes()).expect("key"));
                Node { engine, chain }
            })
            .collect();

        Self {
            nodes,
            keys,
            roster,
            clock,
            ledger: InMemoryState::new(),
            config,
        }
    }

    /// Run the miner-loop timer maintenance on every node and return the
    /// indices whose turn is open.
    pub fn tick(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| {
                node.engine.modify_timer();
                node.engine.is_turn().then_some(i)
            })
            .collect()
    }

    /// Build a block on node `index`'s head and try to seal it.
    pub fn produce(&self, index: usize) -> ConsensusResult<Option<Block>> {
        let node = &self.nodes[index];
        let parent = node.chain.current_header();
        let mut header = BlockHeader {
            parent_hash: parent.hash(),
            number: parent.number + 1,
            coinbase: node.engine.coinbase(),
            gas_limit: 30_000_000,
            ..Default::default()
        };

        node.engine.prepare(node.chain.as_ref(), &mut header)?;
        let block = node.engine.finalize(
            node.chain.as_ref(),
            header,
            &self.ledger,
            vec![],
            vec![],
            &[],
        )?;
        let sealed = node.engine.seal(node.chain.as_ref(), block)?;
        if let Some(block) = &sealed {
            node.chain.insert(block.header.clone());
        }
        Ok(sealed)
    }

    /// Deliver `block` to every node except `from`. Each verifies it and
    /// imports it on success. Returns the per-peer outcome.
    pub fn broadcast(&self, from: usize, block: &Block) -> Vec<ConsensusResult<()>> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != from)
            .map(|(_, node)| -> ConsensusResult<()> {
                let chain = node.chain.as_ref();
                node.engine.verify_header(chain, &block.header)?;
                node.engine.verify_seal(chain, &block.header)?;
                node.engine.verify_uncles(chain, block)?;
                node.chain.insert(block.header.clone());
                Ok(())
            })
            .collect()
    }

    /// Produce on whichever node has the turn and gossip the result.
    /// Panics unless exactly one node may seal.
    pub fn step(&self) -> Block {
        let ready = self.tick();
        assert_eq!(ready.len(), 1, "expected exactly one producer, got {ready:?}");
        let producer = ready[0];

        let block = self
            .produce(producer)
            .expect("seal")
            .expect("turn was open");
        for outcome in self.broadcast(producer, &block) {
            outcome.expect("peer accepted block");
        }
        block
    }

    pub fn index_of(&self, block: &Block) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.address() == block.header.coinbase)
    }

    pub fn heads_agree(&self) -> bool {
        let head = self.nodes[0].chain.current_header().hash();
        self.nodes
            .iter()
            .all(|n| n.chain.current_header().hash() == head)
    }
}
