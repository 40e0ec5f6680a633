//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Tool invocations (count and duration per tool)
//! - Verification of produced artifacts
//! - Conversions and tag writes

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Process Metrics
// =============================================================================

/// Tool invocations by tool and status.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "soundsmith_tool_invocations_total",
            "Total external tool invocations",
        ),
        &["tool", "status"], // status: "success", "failed", "timeout", "not_found", "error"
    )
    .unwrap()
});

/// Tool run time in seconds.
pub static TOOL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "soundsmith_tool_duration_seconds",
            "Wall-clock duration of external tool runs",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 180.0, 600.0]),
        &["tool"],
    )
    .unwrap()
});

// =============================================================================
// Verification Metrics
// =============================================================================

/// Artifact verifications by result.
pub static VERIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "soundsmith_verifications_total",
            "Total post-execution verifications",
        ),
        &["result"], // "accepted", "missing", "unreadable", "wrong_format", "tag_mismatch"
    )
    .unwrap()
});

// =============================================================================
// Converter and Tagger Metrics
// =============================================================================

/// Conversions by source format, target format and status.
pub static CONVERSIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("soundsmith_conversions_total", "Total format conversions"),
        &["source", "target", "status"],
    )
    .unwrap()
});

/// Tag and artwork edits by format, operation and status.
pub static TAG_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("soundsmith_tag_writes_total", "Total tag and artwork edits"),
        &["format", "operation", "status"],
    )
    .unwrap()
});

/// Label value for an operation outcome.
pub fn status_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "failed"
    }
}

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Process
        Box::new(TOOL_INVOCATIONS.clone()),
        Box::new(TOOL_DURATION.clone()),
        // Verification
        Box::new(VERIFICATIONS.clone()),
        // Converters and taggers
        Box::new(CONVERSIONS.clone()),
        Box::new(TAG_WRITES.clone()),
    ]
}
