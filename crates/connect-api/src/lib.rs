//! connect-api — the scrape endpoint.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Collect a cluster snapshot and render it |
//! | GET | `/` | Redirect to `/metrics` |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use connect_metrics::{ClusterCollector, MetricsSink};

/// Shared state for scrape handlers.
#[derive(Clone)]
pub struct ScrapeState {
    pub collector: Arc<ClusterCollector>,
    pub sink: Arc<MetricsSink>,
}

/// Build the scrape router.
pub fn build_router(state: ScrapeState) -> Router {
    Router::new()
        .route("/", get(handlers::redirect_to_metrics))
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
}
