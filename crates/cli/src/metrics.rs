//! Prometheus text rendering of the core metrics.

use prometheus::{Encoder, Registry, TextEncoder};

use soundsmith_core::metrics::all_metrics;

/// Registry holding every core metric.
pub fn registry() -> anyhow::Result<Registry> {
    let registry = Registry::new();
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(registry)
}

/// Encodes all metrics in Prometheus text format.
pub fn encode_metrics() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = registry()?.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
