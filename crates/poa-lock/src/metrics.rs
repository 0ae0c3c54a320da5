//! # PoA Lock Metrics
//!
//! Prometheus metrics for monitoring validation outcomes when the lock is
//! hosted in a node or a test harness.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! poa-lock = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `poa_subblocks_authorized_total` - Counter of accepted subblocks
//! - `poa_authority_changes_total` - Counter of accepted setup replacements
//! - `poa_rejections_total` - Counter of rejected transactions (by reason)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total subblocks authorized
    pub static ref SUBBLOCKS_AUTHORIZED: IntCounter = register_int_counter!(
        "poa_subblocks_authorized_total",
        "Total number of subblock transactions authorized"
    )
    .expect("Failed to create SUBBLOCKS_AUTHORIZED metric");

    /// Total setup replacements authorized
    pub static ref AUTHORITY_CHANGES: IntCounter = register_int_counter!(
        "poa_authority_changes_total",
        "Total number of PoA setup replacements authorized"
    )
    .expect("Failed to create AUTHORITY_CHANGES metric");

    /// Total rejections, labeled by reason
    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "poa_rejections_total",
        "Total number of transactions rejected by the PoA lock",
        &["reason"]
    )
    .expect("Failed to create REJECTIONS metric");
}

/// Record an authorized subblock
#[cfg(feature = "metrics")]
pub fn record_subblock_authorized() {
    SUBBLOCKS_AUTHORIZED.inc();
}

/// Record an authorized setup replacement
#[cfg(feature = "metrics")]
pub fn record_authority_change() {
    AUTHORITY_CHANGES.inc();
}

/// Record a rejection with reason
#[cfg(feature = "metrics")]
pub fn record_rejected(reason: &str) {
    REJECTIONS.with_label_values(&[reason]).inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_subblock_authorized() {}

#[cfg(not(feature = "metrics"))]
pub fn record_authority_change() {}

#[cfg(not(feature = "metrics"))]
pub fn record_rejected(_reason: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_noop_when_disabled() {
        record_subblock_authorized();
        record_authority_change();
        record_rejected("test");
    }
}
