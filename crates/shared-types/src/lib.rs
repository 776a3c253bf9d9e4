//! # Shared Types Crate
//!
//! Host-chain entities shared between the consensus engine and the node that
//! embeds it.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: headers, blocks, transactions and receipts
//!   are defined once, here.
//! - **Canonical Hashing**: `BlockHeader::seal_hash` is the exact byte string
//!   producers sign and validators recover from.

pub mod entities;

pub use entities::*;
