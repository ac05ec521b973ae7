//! Gauges exported to Prometheus.
//!
//! One gauge per distinct `jstat` column name, created the first time the
//! column is observed and overwritten on every later observation. The
//! registry also carries the exporter's own scrape health metrics.

use std::collections::HashMap;
use std::time::Duration;

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::debug;

use crate::NAMESPACE;
use crate::collector::jstat::{Observation, ReportMode, mode};

/// Owns every exported metric.
pub struct GaugeRegistry {
    registry: Registry,
    gauges: HashMap<String, Gauge>,
    scrape_errors: IntCounterVec,
    scrape_success: GaugeVec,
    scrape_duration: Gauge,
}

impl GaugeRegistry {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let scrape_errors = IntCounterVec::new(
            Opts::new(
                "scrape_errors_total",
                "Number of jstat invocations that failed or could not be parsed.",
            )
            .namespace(NAMESPACE),
            &["mode"],
        )?;
        let scrape_success = GaugeVec::new(
            Opts::new(
                "scrape_success",
                "Whether the last jstat invocation for a report mode succeeded.",
            )
            .namespace(NAMESPACE),
            &["mode"],
        )?;
        let scrape_duration = Gauge::with_opts(
            Opts::new(
                "scrape_duration_seconds",
                "Time spent running jstat for the last scrape.",
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(scrape_errors.clone()))?;
        registry.register(Box::new(scrape_success.clone()))?;
        registry.register(Box::new(scrape_duration.clone()))?;

        Ok(Self {
            registry,
            gauges: HashMap::new(),
            scrape_errors,
            scrape_success,
            scrape_duration,
        })
    }

    /// Sets gauge `name` to `value`, registering it on first use.
    pub fn observe(&mut self, name: &str, value: f64) -> prometheus::Result<()> {
        if let Some(gauge) = self.gauges.get(name) {
            gauge.set(value);
            return Ok(());
        }

        let gauge = new_gauge(name)?;
        self.registry.register(Box::new(gauge.clone()))?;
        gauge.set(value);
        debug!(metric = name, "registered gauge");
        self.gauges.insert(name.to_string(), gauge);
        Ok(())
    }

    /// Sets every observed gauge, or none of them.
    ///
    /// Missing gauges are created and registered before any value is written.
    /// If one of them cannot be, the ones registered by this call are removed
    /// again and existing gauges keep their values.
    pub fn observe_all(&mut self, observations: &[Observation]) -> prometheus::Result<()> {
        let mut created: Vec<(&'static str, Gauge)> = Vec::new();
        for obs in observations {
            if self.gauges.contains_key(obs.name) || created.iter().any(|(n, _)| *n == obs.name) {
                continue;
            }
            created.push((obs.name, new_gauge(obs.name)?));
        }

        for (i, (name, gauge)) in created.iter().enumerate() {
            if let Err(e) = self.registry.register(Box::new(gauge.clone())) {
                for (_, registered) in &created[..i] {
                    let _ = self.registry.unregister(Box::new(registered.clone()));
                }
                return Err(e);
            }
            debug!(metric = *name, "registered gauge");
        }

        for (name, gauge) in created {
            self.gauges.insert(name.to_string(), gauge);
        }
        for obs in observations {
            if let Some(gauge) = self.gauges.get(obs.name) {
                gauge.set(obs.value);
            }
        }
        Ok(())
    }

    /// Current value of gauge `name`, if it was ever observed.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).map(|g| g.get())
    }

    /// Number of column gauges created so far.
    pub fn len(&self) -> usize {
        self.gauges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty()
    }

    pub fn record_success(&self, mode: ReportMode) {
        self.scrape_success
            .with_label_values(&[mode.option()])
            .set(1.0);
    }

    pub fn record_failure(&self, mode: ReportMode) {
        self.scrape_errors.with_label_values(&[mode.option()]).inc();
        self.scrape_success
            .with_label_values(&[mode.option()])
            .set(0.0);
    }

    pub fn scrape_errors(&self, mode: ReportMode) -> u64 {
        self.scrape_errors.with_label_values(&[mode.option()]).get()
    }

    pub fn set_scrape_duration(&self, elapsed: Duration) {
        self.scrape_duration.set(elapsed.as_secs_f64());
    }

    /// Snapshot of all metric families, sorted by name.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Renders every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let families = self.gather();
        let mut buffer = Vec::with_capacity(4096);
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn new_gauge(name: &str) -> prometheus::Result<Gauge> {
    Gauge::with_opts(Opts::new(name, mode::describe(name)).namespace(NAMESPACE))
}

/// Content type of [`GaugeRegistry::encode`] output.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
