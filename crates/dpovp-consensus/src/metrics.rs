//! # Consensus Metrics
//!
//! Prometheus metrics for monitoring the round-robin schedule.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! dpovp-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `dpovp_headers_verified_total` - Counter of headers accepted
//! - `dpovp_headers_rejected_total` - Counter of rejected headers (by reason)
//! - `dpovp_blocks_sealed_total` - Counter of blocks sealed locally
//! - `dpovp_turn_windows_opened_total` - Counter of turn windows opened

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total headers that passed verification
    pub static ref HEADERS_VERIFIED: IntCounter = register_int_counter!(
        "dpovp_headers_verified_total",
        "Total number of headers that passed verification"
    )
    .expect("Failed to create HEADERS_VERIFIED metric");

    /// Total headers rejected, labeled by rejection reason
    pub static ref HEADERS_REJECTED: CounterVec = register_counter_vec!(
        "dpovp_headers_rejected_total",
        "Total number of headers rejected",
        &["reason"]
    )
    .expect("Failed to create HEADERS_REJECTED metric");

    /// Total blocks sealed by this node
    pub static ref BLOCKS_SEALED: IntCounter = register_int_counter!(
        "dpovp_blocks_sealed_total",
        "Total number of blocks sealed by this node"
    )
    .expect("Failed to create BLOCKS_SEALED metric");

    /// Total turn windows opened for this node
    pub static ref TURN_WINDOWS_OPENED: IntCounter = register_int_counter!(
        "dpovp_turn_windows_opened_total",
        "Total number of sealing windows opened for this node"
    )
    .expect("Failed to create TURN_WINDOWS_OPENED metric");
}

/// Record an accepted header
#[cfg(feature = "metrics")]
pub fn record_header_verified() {
    HEADERS_VERIFIED.inc();
}

/// Record a rejected header with reason
#[cfg(feature = "metrics")]
pub fn record_header_rejected(reason: &str) {
    HEADERS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a locally sealed block
#[cfg(feature = "metrics")]
pub fn record_block_sealed() {
    BLOCKS_SEALED.inc();
}

/// Record the turn flag being set
#[cfg(feature = "metrics")]
pub fn record_turn_opened() {
    TURN_WINDOWS_OPENED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_header_verified() {}

#[cfg(not(feature = "metrics"))]
pub fn record_header_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_sealed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_turn_opened() {}
