//! `jstat` metrics collector.
//!
//! This module runs the JVM `jstat` tool for a target VM, extracts the
//! columns of each report mode and publishes them as gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      JstatCollector                      │
//! │   for each ReportMode (gccapacity, gcold, gcnew, gc):    │
//! │                                                          │
//! │   ┌───────────────┐   ┌──────────────┐   ┌────────────┐  │
//! │   │ CommandRunner │──▶│ jstat::parse │──▶│  Gauge     │  │
//! │   │ (trait)       │   │ extract()    │   │  Registry  │  │
//! │   └───────┬───────┘   └──────────────┘   └────────────┘  │
//! └───────────┼──────────────────────────────────────────────┘
//!             │
//!      ┌──────┴───────┐
//!      │              │
//! ┌────▼───────┐ ┌────▼───────┐
//! │ JstatRunner│ │ MockRunner │
//! │ (process)  │ │ (testing)  │
//! └────────────┘ └────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use jstat_core::collector::{JstatCollector, JstatRunner, resolve_tool};
//! use jstat_core::registry::GaugeRegistry;
//!
//! let tool = resolve_tool("/usr/bin/jstat".as_ref()).unwrap();
//! let collector = JstatCollector::new(JstatRunner::new(tool), "1234");
//! let mut registry = GaugeRegistry::new().unwrap();
//! let report = collector.collect_into(&mut registry);
//! ```
//!
//! ## Testing (with MockRunner)
//!
//! ```
//! use jstat_core::collector::{JstatCollector, MockRunner};
//! use jstat_core::registry::GaugeRegistry;
//!
//! let collector = JstatCollector::new(MockRunner::typical_jvm(), "1234");
//! let mut registry = GaugeRegistry::new().unwrap();
//! let report = collector.collect_into(&mut registry);
//! assert!(report.is_success());
//! assert_eq!(registry.get("fgc"), Some(2.0));
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod jstat;
pub mod mock;
pub mod traits;

pub use collector::{CollectorTiming, JstatCollector, ModeOutcome, ScrapeReport};
pub use jstat::{ColumnMapping, Observation, ParseError, ReportMode};
pub use mock::MockRunner;
pub use traits::{CollectError, CommandRunner, JstatRunner, resolve_tool};
