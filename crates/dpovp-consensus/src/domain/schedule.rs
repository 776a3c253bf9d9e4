//! Producer-side turn scheduling
//!
//! Given the chain head and the local clock, decide when this node's next
//! sealing window opens. The windows computed here are exactly the ones
//! [`check_turn_window`](super::check_turn_window) accepts on the validator
//! side.

use super::config::DpovpConfig;
use super::slot_clock::{elapsed_since_last_block, round_length, slot_distance};
use crate::ports::SignerDirectory;
use shared_types::{Address, BlockHeader};

/// What the turn timer should do after a head change or a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPlan {
    /// The window is open: set the turn flag immediately.
    OpenNow,
    /// Arm the timer to open the window after this many milliseconds.
    WaitFor(u64),
    /// Leave the timer as it is.
    Keep,
}

impl TurnPlan {
    fn after(wait_ms: i64) -> Self {
        if wait_ms <= 0 {
            TurnPlan::OpenNow
        } else {
            TurnPlan::WaitFor(wait_ms as u64)
        }
    }
}

/// Plan the next turn of `coinbase` on top of `head` at wall time `now`.
pub fn plan_turn(
    now: u64,
    head: &BlockHeader,
    coinbase: &Address,
    roster: &dyn SignerDirectory,
    config: &DpovpConfig,
) -> TurnPlan {
    if roster.index_of(coinbase).is_none() {
        return TurnPlan::Keep;
    }

    let n = roster.count();
    if n == 1 {
        return TurnPlan::WaitFor(config.block_interval_ms);
    }

    let window = config.window();
    let interval = config.interval();
    let elapsed = elapsed_since_last_block(now, head.timestamp, interval);
    let slot = slot_distance(&head.coinbase, coinbase, roster);
    let round = round_length(n, window);

    match slot {
        0 => {
            if elapsed > round {
                let fold = elapsed % round;
                TurnPlan::after((n as i64 - 1).saturating_mul(window).saturating_sub(fold))
            } else {
                TurnPlan::Keep
            }
        }
        1 => {
            if elapsed > round {
                let fold = elapsed % round;
                if fold < window {
                    TurnPlan::OpenNow
                } else {
                    TurnPlan::after(round - fold)
                }
            } else if elapsed > window {
                TurnPlan::after(round - elapsed)
            } else if elapsed >= interval {
                TurnPlan::OpenNow
            } else {
                TurnPlan::after(interval - elapsed)
            }
        }
        k => {
            let fold = elapsed % round;
            let opens_at = (k as i64 - 1).saturating_mul(window);
            if fold >= (k as i64).saturating_mul(window) {
                // this round's window has passed, wait for the next one
                TurnPlan::after(round.saturating_sub(fold).saturating_add(opens_at))
            } else {
                TurnPlan::after(opens_at.saturating_sub(fold))
            }
        }
    }
}
