//! Block reward

use crate::ports::StateAccessor;
use shared_types::{BlockHeader, U256};

/// Fixed credit for every sealed block: 5 * 10^18 base units.
pub const BLOCK_REWARD: U256 = U256([5_000_000_000_000_000_000, 0, 0, 0]);

/// Credit the block reward to the header's coinbase.
pub fn accumulate_rewards(state: &dyn StateAccessor, header: &BlockHeader) {
    state.add_balance(&header.coinbase, BLOCK_REWARD);
}
