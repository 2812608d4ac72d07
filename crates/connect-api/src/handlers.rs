//! Scrape handlers.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use tracing::error;

use connect_metrics::prometheus::CONTENT_TYPE as EXPOSITION_CONTENT_TYPE;

use crate::ScrapeState;

/// GET /
pub async fn redirect_to_metrics() -> Redirect {
    Redirect::to("/metrics")
}

/// GET /metrics
///
/// Runs one collection, records it into the sink, and returns the
/// rendered gauges. Collection runs on its own task so a panic there
/// becomes a 500 instead of a dropped connection.
pub async fn prometheus_metrics(State(state): State<ScrapeState>) -> impl IntoResponse {
    let scrape = tokio::spawn(async move {
        let snapshot = state.collector.run().await;
        state.sink.record(&snapshot).await;
        state.sink.render().await
    });

    match scrape.await {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("metrics scrape failed: {e}"),
            )
                .into_response()
        }
    }
}
