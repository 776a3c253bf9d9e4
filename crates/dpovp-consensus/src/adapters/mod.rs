//! Adapters layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, for tests and for
//! embedding the engine without a full node.

mod chain;
mod clock;
mod state;

pub use chain::*;
pub use clock::*;
pub use state::*;
