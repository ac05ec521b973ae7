mod auth;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};

use jstat_core::collector::{CommandRunner, JstatCollector, JstatRunner, ReportMode, resolve_tool};
use jstat_core::registry::GaugeRegistry;

use auth::{AccessLogLayer, BasicCredentials};
use state::AppState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "jstat-exporter", about = "Prometheus exporter for JVM jstat statistics", version = jstat_core::VERSION)]
struct Args {
    /// Address on which to expose metrics and web interface.
    /// A bare ":PORT" listens on all interfaces.
    #[arg(long = "web.listen-address", default_value = ":9010", env = "JSTAT_LISTEN_ADDRESS", value_parser = parse_listen_address)]
    listen_address: SocketAddr,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics", env = "JSTAT_TELEMETRY_PATH", value_parser = parse_telemetry_path)]
    telemetry_path: String,

    /// Path to the jstat executable, or a bare name to look up in PATH.
    #[arg(long = "jstat.path", default_value = "/usr/bin/jstat", env = "JSTAT_PATH")]
    jstat_path: PathBuf,

    /// jstat vmid of the JVM to observe (usually its pid).
    #[arg(long = "target.pid", env = "JSTAT_TARGET_PID", value_parser = parse_target)]
    target_pid: String,

    /// Comma-separated report modes to run on each scrape.
    #[arg(
        long = "collect.modes",
        env = "JSTAT_COLLECT_MODES",
        default_value = "gccapacity,gcold,gcnew,gc",
        value_delimiter = ','
    )]
    modes: Vec<ReportMode>,

    /// Basic Auth username. If set, --web.auth-password is also required.
    #[arg(long = "web.auth-user", env = "JSTAT_AUTH_USER")]
    auth_user: Option<String>,

    /// Basic Auth password.
    #[arg(long = "web.auth-password", env = "JSTAT_AUTH_PASSWORD")]
    auth_password: Option<String>,
}

/// Parses a listen address, accepting the ":PORT" shorthand.
fn parse_listen_address(s: &str) -> Result<SocketAddr, String> {
    let s = s.trim();
    let full = if s.starts_with(':') {
        format!("0.0.0.0{s}")
    } else {
        s.to_string()
    };
    full.parse()
        .map_err(|e| format!("invalid listen address '{}': {}", s, e))
}

/// Validates the metrics path: absolute, not the landing page, no route syntax.
fn parse_telemetry_path(s: &str) -> Result<String, String> {
    if !s.starts_with('/') {
        return Err(format!("telemetry path '{s}' must start with '/'"));
    }
    if s == "/" || s == "/health" {
        return Err(format!("telemetry path '{s}' is reserved"));
    }
    if s
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '<' | '>' | '{' | '}' | '*'))
    {
        return Err(format!("telemetry path '{s}' contains invalid characters"));
    }
    if s.split('/').any(|segment| segment.starts_with(':')) {
        return Err(format!("telemetry path '{s}' has a segment starting with ':'"));
    }
    Ok(s.to_string())
}

fn parse_target(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("target pid must not be empty".to_string());
    }
    Ok(s.to_string())
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("jstat_exporter=info,jstat_core=info")),
        )
        .init();

    // Misconfiguration is fatal before anything binds.
    let tool = match resolve_tool(&args.jstat_path) {
        Ok(tool) => tool,
        Err(e) => {
            error!(path = %args.jstat_path.display(), error = %e, "jstat not usable");
            process::exit(1);
        }
    };

    let auth_creds = match (&args.auth_user, &args.auth_password) {
        (Some(user), Some(password)) => {
            info!("basic auth enabled");
            Some(Arc::new(BasicCredentials {
                user: user.clone(),
                password: password.clone(),
            }))
        }
        (Some(_), None) | (None, Some(_)) => {
            error!("--web.auth-user and --web.auth-password must both be set");
            process::exit(1);
        }
        (None, None) => None,
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    runtime.block_on(async_main(args, tool, auth_creds));
}

async fn async_main(args: Args, tool: PathBuf, auth_creds: Option<Arc<BasicCredentials>>) {
    let registry = match GaugeRegistry::new() {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to create metrics registry");
            process::exit(1);
        }
    };

    let runner = JstatRunner::new(tool);
    info!(
        version = jstat_core::VERSION,
        jstat = %runner.tool().display(),
        "starting jstat exporter"
    );

    let runner: Box<dyn CommandRunner> = Box::new(runner);
    let collector = JstatCollector::new(runner, &args.target_pid).with_modes(&args.modes);
    info!(vmid = collector.target(), modes = ?collector.modes(), "collecting");

    let state = AppState::new(collector, registry, &args.telemetry_path);
    let app = build_app(state, auth_creds).into_make_service_with_connect_info::<SocketAddr>();

    let listener = match tokio::net::TcpListener::bind(args.listen_address).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %args.listen_address, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    info!(addr = %args.listen_address, path = %args.telemetry_path, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }
    info!("shut down");
}

fn build_app(state: AppState, auth_creds: Option<Arc<BasicCredentials>>) -> Router {
    let telemetry_path = state.telemetry_path.to_string();

    let mut app = Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(handlers::handle_health))
        .route(&telemetry_path, get(handlers::handle_metrics))
        .with_state(state);

    if let Some(creds) = auth_creds {
        app = app.layer(axum::middleware::from_fn_with_state(
            creds,
            auth::basic_auth_middleware,
        ));
    }

    // Outermost: sees the final status and the authenticated user.
    app.layer(AccessLogLayer).layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "cannot install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
