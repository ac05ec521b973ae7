//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jstat_core::collector::{CommandRunner, JstatCollector};
use jstat_core::registry::GaugeRegistry;

pub(crate) struct ExporterInner {
    pub(crate) collector: JstatCollector<Box<dyn CommandRunner>>,
    // Written only while the whole scrape holds the lock.
    pub(crate) registry: GaugeRegistry,
}

pub(crate) type SharedState = Arc<Mutex<ExporterInner>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) inner: SharedState,
    pub(crate) telemetry_path: Arc<str>,
}

impl AppState {
    pub(crate) fn new(
        collector: JstatCollector<Box<dyn CommandRunner>>,
        registry: GaugeRegistry,
        telemetry_path: &str,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ExporterInner {
                collector,
                registry,
            })),
            telemetry_path: Arc::from(telemetry_path),
        }
    }
}

/// Locks the exporter, recovering from a scrape that panicked mid-way.
/// Gauges hold plain values, so a poisoned lock leaves nothing inconsistent.
pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, ExporterInner> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
