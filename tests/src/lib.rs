//! # DPoVP Test Suite
//!
//! Cross-crate tests that run several engines against each other.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── network.rs      # Multi-node fixture sharing one clock
//!     ├── round_robin.rs  # Turn rotation, missed turns, rewards
//!     └── batch_import.rs # Syncing a produced chain via verify_headers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dpovp-tests
//!
//! # With engine logs
//! RUST_LOG=dpovp_consensus=debug cargo test -p dpovp-tests -- --nocapture
//! ```

#![allow(dead_code)]

pub mod integration;
