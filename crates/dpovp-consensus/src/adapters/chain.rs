//! In-memory header chain

use crate::ports::{ChainConfig, ChainReader};
use parking_lot::RwLock;
use shared_types::{BlockHeader, Hash};
use std::collections::HashMap;
use std::sync::Arc;

/// Header store keyed by `(hash, number)` with a longest-chain head.
pub struct InMemoryChain {
    headers: RwLock<HashMap<(Hash, u64), BlockHeader>>,
    head: RwLock<BlockHeader>,
    config: ChainConfig,
}

impl InMemoryChain {
    pub fn new(genesis: BlockHeader, config: ChainConfig) -> Self {
        let mut headers = HashMap::new();
        headers.insert((genesis.hash(), genesis.number), genesis.clone());
        Self {
            headers: RwLock::new(headers),
            head: RwLock::new(genesis),
            config,
        }
    }

    /// Store a header. It becomes the head if it is higher than the current
    /// one.
    pub fn insert(&self, header: BlockHeader) {
        let key = (header.hash(), header.number);
        {
            let mut head = self.head.write();
            if header.number > head.number {
                *head = header.clone();
            }
        }
        self.headers.write().insert(key, header);
    }

    /// Force the head, e.g. after a reorg decided elsewhere.
    pub fn set_head(&self, header: BlockHeader) {
        self.headers
            .write()
            .insert((header.hash(), header.number), header.clone());
        *self.head.write() = header;
    }

    /// Closure returning the current head, for binding an engine to this
    /// chain.
    pub fn head_accessor(self: &Arc<Self>) -> Arc<dyn Fn() -> BlockHeader + Send + Sync> {
        let chain = Arc::clone(self);
        Arc::new(move || chain.current_header())
    }

    pub fn len(&self) -> usize {
        self.headers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.read().is_empty()
    }
}

impl ChainReader for InMemoryChain {
    fn get_header(&self, hash: &Hash, number: u64) -> Option<BlockHeader> {
        self.headers.read().get(&(*hash, number)).cloned()
    }

    fn current_header(&self) -> BlockHeader {
        self.head.read().clone()
    }

    fn config(&self) -> &ChainConfig {
        &self.config
    }
}
