//! Multi-node integration scenarios.

pub mod batch_import;
pub mod network;
pub mod round_robin;
