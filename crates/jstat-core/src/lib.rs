//! jstat-core: the parse-and-map pipeline behind `jstat-exporter`.
//!
//! Provides:
//! - `collector`: report modes, the `jstat` command runner, the column
//!   extractor and the per-scrape collector that chains them
//! - `registry`: lazily created Prometheus gauges plus exporter self-metrics

pub mod collector;
pub mod registry;

/// Crate version with the short git SHA of the build.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("JSTAT_GIT_SHA"), ")");

/// Prefix applied to every exported metric name.
pub const NAMESPACE: &str = "jstat";
