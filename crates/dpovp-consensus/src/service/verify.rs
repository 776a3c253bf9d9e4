//! Header verification
//!
//! A [`HeaderVerifier`] is a snapshot of everything verification reads from
//! the engine, so batch workers can run on blocking threads without touching
//! engine locks.

use super::HeadAccessor;
use crate::domain::{check_turn_window, slot_distance, ConsensusError, ConsensusResult, DpovpConfig};
use crate::metrics;
use crate::ports::{ChainReader, HeaderBatch, SignerDirectory, TimeSource, VerifyAbort};
use shared_crypto::recover_public_key;
use shared_types::BlockHeader;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub(crate) struct HeaderVerifier {
    pub(crate) config: DpovpConfig,
    pub(crate) roster: Arc<dyn SignerDirectory>,
    pub(crate) current_head: HeadAccessor,
    pub(crate) time_source: Arc<dyn TimeSource>,
}

impl HeaderVerifier {
    /// Verify `header`, resolving its parent from `parents` first and the
    /// chain second.
    pub(crate) fn verify(
        &self,
        chain: &dyn ChainReader,
        header: &BlockHeader,
        parents: &[BlockHeader],
    ) -> ConsensusResult<()> {
        match self.check(chain, header, parents) {
            Ok(()) => {
                metrics::record_header_verified();
                debug!(number = header.number, coinbase = ?header.coinbase, "Header verified");
                Ok(())
            }
            Err(e) => {
                metrics::record_header_rejected(e.reason());
                warn!(number = header.number, coinbase = ?header.coinbase, error = %e, "Header rejected");
                Err(e)
            }
        }
    }

    fn check(
        &self,
        chain: &dyn ChainReader,
        header: &BlockHeader,
        parents: &[BlockHeader],
    ) -> ConsensusResult<()> {
        if header.number == 0 {
            return Err(ConsensusError::InvalidNumber);
        }

        let parent = parents
            .iter()
            .find(|p| p.hash() == header.parent_hash)
            .cloned()
            .or_else(|| chain.get_header(&header.parent_hash, header.number - 1))
            .ok_or(ConsensusError::MissingAncestor {
                parent_hash: header.parent_hash,
                number: header.number,
            })?;

        let now = self.time_source.now();
        if header.timestamp > now {
            return Err(ConsensusError::FutureTimestamp {
                timestamp: header.timestamp,
                now,
            });
        }

        let signer = recover_public_key(&header.seal_hash(), &header.signature)
            .map_err(ConsensusError::SignatureRecoveryFailure)?;
        let expected = self
            .roster
            .pubkey_of(&header.coinbase)
            .ok_or(ConsensusError::UnknownSigner(header.coinbase))?;
        if signer != expected {
            return Err(ConsensusError::SignerMismatch(header.coinbase));
        }

        // the first block on top of genesis has no schedule to follow yet
        if (self.current_head)().number == 0 && parent.number == 0 {
            return Ok(());
        }

        if header.timestamp < parent.timestamp {
            return Err(ConsensusError::TimestampBeforeParent {
                timestamp: header.timestamp,
                parent: parent.timestamp,
            });
        }

        let timespan = (header.timestamp - parent.timestamp) as i64 * 1000;
        let slot = slot_distance(&parent.coinbase, &header.coinbase, self.roster.as_ref());
        check_turn_window(timespan, slot, self.roster.count(), &self.config)?;
        Ok(())
    }
}

/// Verify `headers` on one blocking worker each and forward the results in
/// input order.
pub(crate) fn spawn_batch(
    runtime: &Handle,
    verifier: HeaderVerifier,
    chain: Arc<dyn ChainReader>,
    headers: Vec<BlockHeader>,
) -> HeaderBatch {
    let verifier = Arc::new(verifier);
    let headers: Arc<[BlockHeader]> = headers.into();
    let (abort, mut aborted) = VerifyAbort::new();
    let (results_tx, results) = mpsc::channel(headers.len().max(1));

    let workers: Vec<_> = (0..headers.len())
        .map(|i| {
            let verifier = Arc::clone(&verifier);
            let chain = Arc::clone(&chain);
            let headers = Arc::clone(&headers);
            runtime.spawn_blocking(move || verifier.verify(chain.as_ref(), &headers[i], &headers[..i]))
        })
        .collect();

    runtime.spawn(async move {
        let mut abort_live = true;
        for mut worker in workers {
            let result = loop {
                tokio::select! {
                    biased;
                    changed = aborted.changed(), if abort_live => match changed {
                        Ok(()) if *aborted.borrow() => {
                            debug!("Header batch aborted");
                            return;
                        }
                        Ok(()) => continue,
                        // handle dropped without aborting
                        Err(_) => abort_live = false,
                    },
                    joined = &mut worker => {
                        break joined.unwrap_or_else(|e| Err(ConsensusError::WorkerFailed(e.to_string())));
                    }
                }
            };
            if *aborted.borrow() || results_tx.send(result).await.is_err() {
                return;
            }
        }
    });

    HeaderBatch { abort, results }
}
