//! # Batch Import
//!
//! A node that joins late syncs the produced chain through
//! `verify_headers`, using earlier headers of the batch as ancestors.

#[cfg(test)]
mod tests {
    use crate::integration::network::TestNetwork;
    use dpovp_consensus::{
        ChainConfig, ConsensusEngine, ConsensusError, DpovpConfig, DpovpEngine,
        EngineDependencies, InMemoryChain,
    };
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::BlockHeader;
    use std::sync::Arc;

    const T0: u64 = 1_700_000_000;

    fn config() -> DpovpConfig {
        DpovpConfig {
            timeout_ms: 10_000,
            block_interval_ms: 3_000,
        }
    }

    /// Produce `blocks` blocks on a fresh 3-signer network.
    fn produced_chain(blocks: usize) -> (TestNetwork, Vec<BlockHeader>) {
        let net = TestNetwork::new(3, config(), T0);
        let mut headers = Vec::with_capacity(blocks);
        for _ in 0..blocks {
            headers.push(net.step().header);
            net.clock.advance(3);
        }
        (net, headers)
    }

    /// A non-signing observer that knows only genesis.
    fn observer(net: &TestNetwork) -> (DpovpEngine, Arc<InMemoryChain>) {
        let chain = Arc::new(InMemoryChain::new(
            BlockHeader::default(),
            ChainConfig::default(),
        ));
        let engine = DpovpEngine::new(EngineDependencies {
            config: config(),
            roster: net.roster.clone(),
            coinbase: Secp256k1KeyPair::generate().address(),
            current_head: chain.head_accessor(),
        })
        .unwrap()
        .with_time_source(Box::new(net.clock.clone()));
        (engine, chain)
    }

    async fn collect(
        engine: &DpovpEngine,
        chain: &Arc<InMemoryChain>,
        headers: Vec<BlockHeader>,
    ) -> Vec<Result<(), ConsensusError>> {
        let mut batch = engine.verify_headers(chain.clone(), headers);
        let mut results = Vec::new();
        while let Some(result) = batch.results.recv().await {
            results.push(result);
        }
        results
    }

    #[tokio::test]
    async fn test_observer_imports_produced_chain() {
        let (net, headers) = produced_chain(6);
        let (engine, chain) = observer(&net);

        let results = collect(&engine, &chain, headers.clone()).await;

        assert_eq!(results, vec![Ok(()); 6]);
        for header in headers {
            chain.insert(header);
        }
        assert_eq!(chain.len(), net.nodes[0].chain.len());
    }

    #[tokio::test]
    async fn test_tampered_header_fails_in_place() {
        let (net, mut headers) = produced_chain(5);
        let (engine, chain) = observer(&net);

        headers[2].timestamp += 1;

        let results = collect(&engine, &chain, headers).await;

        assert_eq!(results.len(), 5);
        assert_eq!(results[0], Ok(()));
        assert_eq!(results[1], Ok(()));
        assert!(matches!(
            results[2],
            Err(ConsensusError::SignerMismatch(_))
                | Err(ConsensusError::SignatureRecoveryFailure(_))
        ));
        // its child no longer links to anything the observer knows
        assert!(matches!(
            results[3],
            Err(ConsensusError::MissingAncestor { number: 4, .. })
        ));
        assert_eq!(results[4], Ok(()));
    }

    #[tokio::test]
    async fn test_unknown_roster_rejects_batch() {
        let (net, headers) = produced_chain(2);
        let (engine, chain) = observer(&net);

        let strangers = TestNetwork::new(3, config(), T0);
        engine.set_roster(strangers.roster.clone()).unwrap();

        let results = collect(&engine, &chain, headers).await;
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(ConsensusError::UnknownSigner(_)))));
    }
}
