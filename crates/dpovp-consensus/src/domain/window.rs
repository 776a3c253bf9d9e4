//! Validator-side turn window checks

use super::config::DpovpConfig;
use super::error::OutOfTurn;
use super::slot_clock::round_length;

/// Check that a block produced `timespan_ms` after its parent by a signer
/// `slot` turns after the parent's producer falls in that signer's window.
///
/// `timespan_ms` must not be negative; callers reject such headers first.
pub fn check_turn_window(
    timespan_ms: i64,
    slot: usize,
    signers: usize,
    config: &DpovpConfig,
) -> Result<(), OutOfTurn> {
    let window = config.window();
    let interval = config.interval();

    if signers == 1 {
        return if timespan_ms >= interval {
            Ok(())
        } else {
            Err(OutOfTurn::NotEnoughSleep)
        };
    }

    let round = round_length(signers, window);
    match slot {
        0 => {
            let offset = timespan_ms % round;
            if offset >= round - window && offset < round {
                Ok(())
            } else {
                Err(OutOfTurn::RepeatedProducer)
            }
        }
        1 => {
            if timespan_ms < round {
                if timespan_ms >= interval && timespan_ms < window {
                    Ok(())
                } else {
                    Err(OutOfTurn::OutsideFirstWindow)
                }
            } else if timespan_ms % round < window {
                Ok(())
            } else {
                Err(OutOfTurn::OutsideWrappedWindow)
            }
        }
        k => {
            if (timespan_ms % round) / window == k as i64 - 1 {
                Ok(())
            } else {
                Err(OutOfTurn::WrongSlot)
            }
        }
    }
}
