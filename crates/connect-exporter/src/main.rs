//! connect-exporter — Prometheus exporter for a Kafka Connect cluster.
//!
//! Every scrape of `/metrics` lists the cluster's connectors, queries
//! their status concurrently, and renders connector and task states as
//! gauges.
//!
//! # Usage
//!
//! ```text
//! connect-exporter --connect-url http://connect:8083 --port 8080
//! connect-exporter --config /etc/connect-exporter.toml
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use connect_client::{ClientOptions, HttpConnectClient};
use connect_metrics::{ClusterCollector, MetricsSink};

use crate::config::{ExporterConfig, LogFormat};

const DEFAULT_LOG_FILTER: &str = "info,connect_exporter=debug,connect_metrics=debug";

#[derive(Parser)]
#[command(name = "connect-exporter", about = "Kafka Connect Prometheus exporter")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the Connect REST API.
    #[arg(long)]
    connect_url: Option<String>,

    /// Port to serve /metrics on.
    #[arg(long)]
    port: Option<u16>,

    /// Budget for one collection run, in milliseconds.
    #[arg(long)]
    scrape_timeout_ms: Option<u64>,

    /// Budget for one request to the Connect cluster, in milliseconds.
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Extra request header for the Connect cluster, as `name: value`. Repeatable.
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,
}

impl Cli {
    /// Resolve the effective configuration: defaults < file < flags.
    fn into_config(self) -> anyhow::Result<ExporterConfig> {
        let mut config = match &self.config {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };

        if let Some(url) = self.connect_url {
            config.connect_url = url;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ms) = self.scrape_timeout_ms {
            config.scrape_timeout_ms = ms;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        for header in self.headers {
            let Some((name, value)) = header.split_once(':') else {
                bail!("header {header:?} must be `name: value`");
            };
            config
                .headers
                .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    init_tracing(config.log_format);
    run(config).await
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(connect_url = %config.connect_url, "Kafka Connect exporter starting");

    // ── Initialize components ──────────────────────────────────

    let mut options = ClientOptions {
        request_timeout: config.request_timeout(),
        ..ClientOptions::default()
    };
    for (name, value) in &config.headers {
        options = options.with_header(name, value)?;
    }
    let client = HttpConnectClient::new(&config.connect_url, options)?;
    info!(
        base_url = client.base_url(),
        headers = config.headers.len(),
        "connect client initialized"
    );

    let collector = ClusterCollector::new(Arc::new(client)).with_deadline(config.scrape_timeout());
    let sink = Arc::new(MetricsSink::new());
    info!(scrape_timeout_ms = config.scrape_timeout_ms, "collector initialized");

    // ── Start scrape server ────────────────────────────────────

    let router = connect_api::build_router(connect_api::ScrapeState {
        collector: Arc::new(collector),
        sink,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "scrape endpoint listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("Kafka Connect exporter stopped");
    Ok(())
}
