//! Per-scrape collector that runs every enabled report mode.
//!
//! The `JstatCollector` chains runner → extractor → registry for each mode in
//! order. A failing mode is logged and counted; the remaining modes still run.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collector::jstat::{Observation, ReportMode, extract};
use crate::collector::traits::{CollectError, CommandRunner};
use crate::registry::GaugeRegistry;

/// Timing information for each report mode.
///
/// Used for debugging and for the scrape duration gauge.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total time across all modes.
    pub total: Duration,
    /// Time spent per mode (command plus parsing), in collection order.
    pub modes: Vec<(ReportMode, Duration)>,
}

/// Outcome of one mode within a scrape.
#[derive(Debug)]
pub struct ModeOutcome {
    pub mode: ReportMode,
    /// Number of gauges updated, or why none were.
    pub result: Result<usize, CollectError>,
}

/// Outcome of a whole scrape.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub outcomes: Vec<ModeOutcome>,
    pub timing: CollectorTiming,
}

impl ScrapeReport {
    /// Total number of gauges updated.
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ModeOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs `jstat` against one target VM.
pub struct JstatCollector<R: CommandRunner> {
    runner: R,
    target: String,
    modes: Vec<ReportMode>,
}

impl<R: CommandRunner> JstatCollector<R> {
    /// Creates a collector for every report mode.
    ///
    /// # Arguments
    /// * `runner` - Command runner (real or mock)
    /// * `target` - jstat vmid of the monitored JVM, usually its pid
    pub fn new(runner: R, target: impl Into<String>) -> Self {
        Self {
            runner,
            target: target.into(),
            modes: ReportMode::ALL.to_vec(),
        }
    }

    /// Restricts collection to `modes`.
    ///
    /// Modes always run in the canonical order; duplicates are dropped.
    pub fn with_modes(mut self, modes: &[ReportMode]) -> Self {
        self.modes = ReportMode::ALL
            .into_iter()
            .filter(|m| modes.contains(m))
            .collect();
        self
    }

    pub fn modes(&self) -> &[ReportMode] {
        &self.modes
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs and parses a single mode without touching any registry.
    pub fn collect_mode(&self, mode: ReportMode) -> Result<Vec<Observation>, CollectError> {
        let output = self.runner.run(mode, &self.target)?;
        extract(&output, mode.columns()).map_err(|error| CollectError::Parse { mode, error })
    }

    /// Runs every enabled mode and publishes the results into `registry`.
    ///
    /// A mode's observations are published only when the whole mode parsed.
    pub fn collect_into(&self, registry: &mut GaugeRegistry) -> ScrapeReport {
        let total_start = Instant::now();
        let mut report = ScrapeReport::default();

        for &mode in &self.modes {
            let start = Instant::now();
            let result = self
                .collect_mode(mode)
                .and_then(|observations| publish(registry, mode, &observations));
            let elapsed = start.elapsed();

            match &result {
                Ok(updated) => {
                    registry.record_success(mode);
                    debug!(
                        mode = mode.option(),
                        updated,
                        duration_ms = elapsed.as_millis() as u64,
                        "jstat mode collected"
                    );
                }
                Err(e) => {
                    registry.record_failure(mode);
                    warn!(mode = mode.option(), vmid = %self.target, error = %e, "jstat mode failed");
                }
            }

            report.timing.modes.push((mode, elapsed));
            report.outcomes.push(ModeOutcome { mode, result });
        }

        report.timing.total = total_start.elapsed();
        registry.set_scrape_duration(report.timing.total);
        report
    }
}

fn publish(
    registry: &mut GaugeRegistry,
    mode: ReportMode,
    observations: &[Observation],
) -> Result<usize, CollectError> {
    registry
        .observe_all(observations)
        .map_err(|e| CollectError::Registry {
            mode,
            reason: e.to_string(),
        })?;
    Ok(observations.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::jstat::ParseError;
    use crate::collector::mock::MockRunner;

    fn registry() -> GaugeRegistry {
        GaugeRegistry::new().unwrap()
    }

    #[test]
    fn test_collect_typical_jvm() {
        let collector = JstatCollector::new(MockRunner::typical_jvm(), "4242");
        let mut registry = registry();

        let report = collector.collect_into(&mut registry);

        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.updated(), 18 + 2 + 6 + 17);
        assert_eq!(report.timing.modes.len(), 4);

        assert_eq!(registry.get("ngcmx"), Some(697856.0));
        assert_eq!(registry.get("mu"), Some(4283.5));
        assert_eq!(registry.get("ou"), Some(9182.3));
        assert_eq!(registry.get("tt"), Some(7.0));
        assert_eq!(registry.get("eu"), Some(21030.6));
        assert_eq!(registry.get("fgc"), Some(2.0));
        assert_eq!(registry.get("gct"), Some(0.083));
    }

    #[test]
    fn test_one_invocation_per_mode_in_order() {
        let collector = JstatCollector::new(MockRunner::typical_jvm(), "4242");
        let mut registry = registry();

        collector.collect_into(&mut registry);

        let calls = collector.runner().calls();
        assert_eq!(
            calls,
            vec![
                (ReportMode::Capacity, "4242".to_string()),
                (ReportMode::Old, "4242".to_string()),
                (ReportMode::New, "4242".to_string()),
                (ReportMode::Summary, "4242".to_string()),
            ]
        );
    }

    #[test]
    fn test_failing_mode_does_not_stop_others() {
        let mut runner = MockRunner::typical_jvm();
        runner.add_failure(ReportMode::Capacity, "exit status: 1");
        let collector = JstatCollector::new(runner, "4242");
        let mut registry = registry();

        let report = collector.collect_into(&mut registry);

        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|o| o.mode).collect();
        assert_eq!(failed, vec![ReportMode::Capacity]);
        assert_eq!(registry.get("ngcmn"), None);
        assert_eq!(registry.get("ou"), Some(9182.3));
        assert_eq!(registry.scrape_errors(ReportMode::Capacity), 1);
        assert_eq!(registry.scrape_errors(ReportMode::Summary), 0);
    }

    #[test]
    fn test_short_row_publishes_nothing_for_mode() {
        let mut runner = MockRunner::new();
        runner.add_output(ReportMode::Capacity, "NGCMN NGCMX NGC\n1024.0 2048.0 4096.0\n");
        let collector =
            JstatCollector::new(runner, "4242").with_modes(&[ReportMode::Capacity]);
        let mut registry = registry();

        let report = collector.collect_into(&mut registry);

        match &report.outcomes[0].result {
            Err(CollectError::Parse { mode, error }) => {
                assert_eq!(*mode, ReportMode::Capacity);
                assert_eq!(
                    *error,
                    ParseError::ColumnOutOfRange {
                        column: 3,
                        available: 3
                    }
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_field() {
        let mut runner = MockRunner::new();
        runner.add_output(ReportMode::Old, "MC MU CCSC CCSU OC OU\n1 n/a 3 4 5 6\n");
        let collector = JstatCollector::new(runner, "1").with_modes(&[ReportMode::Old]);

        let err = collector.collect_mode(ReportMode::Old).unwrap_err();
        assert!(matches!(
            err,
            CollectError::Parse {
                error: ParseError::MalformedField { column: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_gauges_keep_last_good_value() {
        let mut runner = MockRunner::new();
        runner.add_output(ReportMode::Old, "MC MU CCSC CCSU OC OU\n1 2 3 4 5 6\n");
        let collector = JstatCollector::new(runner, "1").with_modes(&[ReportMode::Old]);
        let mut registry = registry();
        collector.collect_into(&mut registry);

        let mut runner = MockRunner::new();
        runner.add_failure(ReportMode::Old, "exit status: 1");
        let collector = JstatCollector::new(runner, "1").with_modes(&[ReportMode::Old]);
        collector.collect_into(&mut registry);

        assert_eq!(registry.get("ou"), Some(6.0));
        assert_eq!(registry.scrape_errors(ReportMode::Old), 1);
    }

    #[test]
    fn test_sequential_scrapes_overwrite() {
        let mut runner = MockRunner::new();
        runner.add_output(ReportMode::Old, "MC MU CCSC CCSU OC OU\n1 2 3 4 5 6\n");
        let mut registry = registry();
        JstatCollector::new(runner, "1")
            .with_modes(&[ReportMode::Old])
            .collect_into(&mut registry);

        let mut runner = MockRunner::new();
        runner.add_output(ReportMode::Old, "MC MU CCSC CCSU OC OU\n1 20 3 4 5 60\n");
        JstatCollector::new(runner, "1")
            .with_modes(&[ReportMode::Old])
            .collect_into(&mut registry);

        assert_eq!(registry.get("mu"), Some(20.0));
        assert_eq!(registry.get("ou"), Some(60.0));
    }

    #[test]
    fn test_with_modes_keeps_canonical_order() {
        let collector = JstatCollector::new(MockRunner::new(), "1").with_modes(&[
            ReportMode::Summary,
            ReportMode::Capacity,
            ReportMode::Summary,
        ]);

        assert_eq!(
            collector.modes(),
            &[ReportMode::Capacity, ReportMode::Summary]
        );
    }

    #[test]
    fn test_vm_gone() {
        let collector = JstatCollector::new(MockRunner::vm_gone(), "4242");
        let mut registry = registry();

        let report = collector.collect_into(&mut registry);

        assert_eq!(report.failures().count(), 4);
        assert_eq!(report.updated(), 0);
        assert!(registry.is_empty());
    }
}
