//! HTTP request handlers: metrics scrape, landing page, health.

use std::time::Instant;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, error, warn};

use jstat_core::registry;

use crate::state::{AppState, lock};

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ============================================================
// Landing page
// ============================================================

pub(crate) async fn handle_index(State(app): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>jstat Exporter</title></head>
<body>
<h1>jstat Exporter</h1>
<p><a href="{path}">Metrics</a></p>
<p>version {version}</p>
</body>
</html>
"#,
        path = app.telemetry_path,
        version = jstat_core::VERSION,
    ))
}

// ============================================================
// Metrics
// ============================================================

/// Runs `jstat` for every enabled mode and returns all gauges.
///
/// The whole collect-and-encode sequence runs under the exporter lock, so
/// concurrent scrapes are serialized and never see a half-updated set.
pub(crate) async fn handle_metrics(State(app): State<AppState>) -> Response {
    let state = app.inner;
    let t0 = Instant::now();

    // jstat is a blocking child process: keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        let mut guard = lock(&state);
        let inner = &mut *guard;
        let report = inner.collector.collect_into(&mut inner.registry);
        (report, inner.registry.encode())
    })
    .await;

    let (report, encoded) = match result {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "scrape panicked in spawn_blocking");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let failed = report.failures().count();
    if failed > 0 {
        warn!(
            failed,
            updated = report.updated(),
            "scrape completed with failing report modes"
        );
    } else {
        debug!(
            updated = report.updated(),
            jstat_ms = report.timing.total.as_millis() as u64,
            total_ms = t0.elapsed().as_millis() as u64,
            "scrape completed"
        );
    }

    match encoded {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, registry::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
