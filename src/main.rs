//! Infinispan Cache Statistics Exporter
//!
//! Serves a Prometheus scrape endpoint that, on every request, runs
//! one collection pass against the application server's Jolokia
//! management endpoint and renders the resulting metric families.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use once_cell::sync::Lazy;
use prometheus::{Counter, Gauge};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use infinispan_exporter::collector::{encode_families, CacheStatsCollector};
use infinispan_exporter::error::{Error, Result};
use infinispan_exporter::management::{JolokiaClient, JolokiaConfig};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Infinispan exporter - cache statistics for Prometheus
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jolokia management endpoint URL
    #[arg(
        long,
        env = "JOLOKIA_URL",
        default_value = "http://localhost:8778/jolokia"
    )]
    jolokia_url: String,

    /// Management request timeout in seconds
    #[arg(long, env = "JOLOKIA_TIMEOUT_SECONDS", default_value = "10")]
    jolokia_timeout_seconds: u64,

    /// Metrics server bind address
    #[arg(long, env = "METRICS_ADDR", default_value = "0.0.0.0:9363")]
    metrics_addr: String,

    /// Health server bind address
    #[arg(long, env = "HEALTH_ADDR", default_value = "0.0.0.0:9364")]
    health_addr: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Exporter Self-Metrics
// =============================================================================

static SCRAPES_TOTAL: Lazy<Counter> = Lazy::new(|| {
    prometheus::register_counter!(
        "infinispan_exporter_scrapes_total",
        "Total number of collection passes served"
    )
    .expect("register scrapes_total")
});

static SKIPPED_RESOURCES: Lazy<Gauge> = Lazy::new(|| {
    prometheus::register_gauge!(
        "infinispan_exporter_skipped_resources",
        "Resources skipped in the last collection pass due to attribute-read failures"
    )
    .expect("register skipped_resources")
});

static SCRAPE_DURATION: Lazy<Gauge> = Lazy::new(|| {
    prometheus::register_gauge!(
        "infinispan_exporter_scrape_duration_seconds",
        "Duration of the last collection pass in seconds"
    )
    .expect("register scrape_duration")
});

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting Infinispan exporter");
    info!("  Jolokia URL: {}", args.jolokia_url);
    info!("  Metrics address: {}", args.metrics_addr);
    info!("  Health address: {}", args.health_addr);

    let jolokia_config = JolokiaConfig {
        base_url: args.jolokia_url.clone(),
        request_timeout: Duration::from_secs(args.jolokia_timeout_seconds),
    };
    let client = JolokiaClient::new(jolokia_config)?;

    // Check management endpoint health
    if let Err(e) = client.health_check().await {
        error!("Management endpoint health check failed: {}", e);
        error!("Continuing anyway - cache statistics may not be available");
    } else {
        info!("Management endpoint healthy");
    }

    let collector = Arc::new(CacheStatsCollector::new(client));

    // Start health server
    let health_addr = args.health_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = run_health_server(&health_addr).await {
            error!("Health server error: {}", e);
        }
    });

    // Run the metrics server in the foreground
    run_metrics_server(&args.metrics_addr, collector).await?;

    info!("Exporter shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

// =============================================================================
// Health Server
// =============================================================================

async fn run_health_server(addr: &str) -> Result<()> {
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn health_handler(
        req: Request<hyper::body::Incoming>,
    ) -> std::result::Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let response = match req.uri().path() {
            "/healthz" | "/livez" | "/readyz" => Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::from("ok")))
                .unwrap(),
            _ => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from("not found")))
                .unwrap(),
        };
        Ok(response)
    }

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Config(format!("Invalid health server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind health server: {}", e)))?;

    info!("Health server listening on {}", addr);

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .map_err(|e| Error::Internal(format!("Health server accept error: {}", e)))?;

        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(health_handler))
                .await
            {
                tracing::error!("Health server connection error: {}", e);
            }
        });
    }
}

// =============================================================================
// Metrics Server
// =============================================================================

async fn run_metrics_server(addr: &str, collector: Arc<CacheStatsCollector>) -> Result<()> {
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response, StatusCode};
    use hyper_util::rt::TokioIo;
    use prometheus::{Encoder, TextEncoder};
    use std::net::SocketAddr;
    use std::time::Instant;

    use tokio::net::TcpListener;

    async fn metrics_handler(
        req: Request<hyper::body::Incoming>,
        collector: Arc<CacheStatsCollector>,
    ) -> std::result::Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let response = match req.uri().path() {
            "/metrics" => {
                let started = Instant::now();
                let assembly = collector.collect().await;

                SCRAPES_TOTAL.inc();
                SKIPPED_RESOURCES.set(assembly.skipped as f64);
                SCRAPE_DURATION.set(started.elapsed().as_secs_f64());

                let mut body = encode_families(&assembly.families);

                // Append exporter self-metrics from the default registry
                let encoder = TextEncoder::new();
                let mut buffer = Vec::new();
                if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
                    tracing::error!("Failed to encode exporter self-metrics: {}", e);
                }
                body.push_str(&String::from_utf8_lossy(&buffer));

                Response::builder()
                    .status(StatusCode::OK)
                    .header("Content-Type", "text/plain; version=0.0.4")
                    .body(Full::new(Bytes::from(body)))
                    .unwrap()
            }
            _ => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .body(Full::new(Bytes::from("not found")))
                .unwrap(),
        };
        Ok(response)
    }

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Config(format!("Invalid metrics server address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind metrics server: {}", e)))?;

    info!("Metrics server listening on {}", addr);

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .map_err(|e| Error::Internal(format!("Metrics server accept error: {}", e)))?;

        let io = TokioIo::new(stream);
        let collector = collector.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let collector = collector.clone();
                async move { metrics_handler(req, collector).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::error!("Metrics server connection error: {}", e);
            }
        });
    }
}
