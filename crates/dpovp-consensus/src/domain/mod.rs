//! Domain layer for the DPoVP engine
//!
//! Everything here is synchronous and free of I/O: slot arithmetic, turn
//! planning and turn window checks are shared verbatim by producers and
//! validators.

mod config;
mod error;
mod reward;
mod roster;
mod schedule;
mod slot_clock;
mod window;

pub use config::*;
pub use error::*;
pub use reward::*;
pub use roster::*;
pub use schedule::*;
pub use slot_clock::*;
pub use window::*;
