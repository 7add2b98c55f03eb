// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::path::Path;

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// Outcome per bond: ok | transport | rejected | malformed
pub static VALUATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bond_valuations_total", "bond valuations by outcome"),
        &["outcome"],
    )
    .unwrap()
});

// Latency of one SBCPrice POST (seconds)
pub static SBC_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(HistogramOpts::new(
        "sbcprice_request_seconds",
        "Latency of SBCPrice calculator requests (s)",
    ))
    .unwrap()
});

pub static BATCH_BONDS: Lazy<IntGauge> =
    Lazy::new(|| IntGauge::new("batch_bonds", "bonds in the last batch").unwrap());

pub static PORTFOLIO_VALUE: Lazy<Gauge> =
    Lazy::new(|| Gauge::new("portfolio_value_usd", "total value of the last batch (USD)").unwrap());

pub fn init() {
    // Register all metrics to the custom registry (double register -> Err, ignored)
    for m in [
        REGISTRY.register(Box::new(VALUATIONS.clone())),
        REGISTRY.register(Box::new(SBC_LATENCY.clone())),
        REGISTRY.register(Box::new(BATCH_BONDS.clone())),
        REGISTRY.register(Box::new(PORTFOLIO_VALUE.clone())),
    ] {
        let _ = m;
    }
}

// Encode all metrics in Prometheus text format
fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

/// Dump the registry for a node_exporter textfile collector.
pub fn write_textfile(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_metrics())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textfile_contains_registered_families() {
        init();
        VALUATIONS.with_label_values(&["ok"]).inc();
        BATCH_BONDS.set(3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ee.prom");
        write_textfile(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("bond_valuations_total{outcome=\"ok\"}"), "{text}");
        assert!(text.contains("batch_bonds"), "{text}");
    }
}
