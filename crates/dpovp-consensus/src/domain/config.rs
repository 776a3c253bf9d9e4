//! Engine configuration

use super::error::{ConsensusError, ConsensusResult};
use serde::{Deserialize, Serialize};

/// Longest accepted signer window: one day.
pub const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

/// Timing parameters of the round-robin schedule.
///
/// Both values are in milliseconds. A round lasts `signers * timeout_ms`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpovpConfig {
    /// Window each signer owns per round.
    pub timeout_ms: u64,
    /// Minimum gap between two consecutive blocks.
    pub block_interval_ms: u64,
}

impl Default for DpovpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            block_interval_ms: 3_000,
        }
    }
}

impl DpovpConfig {
    /// Check the window arithmetic is well defined.
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.timeout_ms == 0 {
            return Err(ConsensusError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConsensusError::InvalidConfig(format!(
                "timeout_ms ({}) exceeds the {} ms ceiling",
                self.timeout_ms, MAX_TIMEOUT_MS
            )));
        }
        if self.block_interval_ms > self.timeout_ms {
            return Err(ConsensusError::InvalidConfig(format!(
                "block_interval_ms ({}) exceeds timeout_ms ({})",
                self.block_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }

    /// Timeout window as a signed quantity for slot arithmetic.
    pub(crate) fn window(&self) -> i64 {
        i64::try_from(self.timeout_ms).unwrap_or(i64::MAX)
    }

    /// Block interval as a signed quantity for slot arithmetic.
    pub(crate) fn interval(&self) -> i64 {
        i64::try_from(self.block_interval_ms).unwrap_or(i64::MAX)
    }
}
