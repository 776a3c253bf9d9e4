//! Slot arithmetic
//!
//! Pure functions shared by the producer side (turn scheduling) and the
//! validator side (turn window checks). Both sides must agree exactly, so all
//! durations are signed milliseconds and every modulus is Euclidean.

use crate::ports::SignerDirectory;
use shared_types::{Address, ZERO_ADDRESS};

/// Milliseconds since the block stamped `last_timestamp`.
///
/// A zero timestamp marks the genesis block, which has no meaningful time;
/// `genesis_fallback_ms` stands in for the elapsed time in that case.
pub fn elapsed_since_last_block(now: u64, last_timestamp: u64, genesis_fallback_ms: i64) -> i64 {
    if last_timestamp == 0 {
        return genesis_fallback_ms;
    }
    (now as i64 - last_timestamp as i64).saturating_mul(1000)
}

/// Turn distance from the producer `from` to the candidate `to`.
///
/// `0` means `to` produced the reference block, `1` that `to` is next in
/// line, `k` that `to` waits `k - 1` further turns. The result lies in
/// `[0, n)` except after genesis: a zero `from` puts every member one slot
/// past its own index, so the last member gets `n`.
/// Non-members count as index -1.
pub fn slot_distance(from: &Address, to: &Address, roster: &dyn SignerDirectory) -> usize {
    let to_index = signed_index(to, roster);
    if *from == ZERO_ADDRESS {
        return (to_index + 1) as usize;
    }

    let n = roster.count() as i64;
    if n == 1 {
        return 1;
    }

    let from_index = signed_index(from, roster);
    (to_index - from_index + n).rem_euclid(n) as usize
}

/// Length of one full rotation through the roster, saturating at
/// `i64::MAX`.
pub fn round_length(signers: usize, timeout_ms: i64) -> i64 {
    i64::try_from(signers)
        .unwrap_or(i64::MAX)
        .saturating_mul(timeout_ms)
}

fn signed_index(address: &Address, roster: &dyn SignerDirectory) -> i64 {
    roster.index_of(address).map(|i| i as i64).unwrap_or(-1)
}
