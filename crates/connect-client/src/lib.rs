//! connect-client — typed access to the Kafka Connect REST API.
//!
//! The [`ConnectApi`] trait is the narrow surface the metrics collector
//! depends on (connector discovery and status). [`HttpConnectClient`]
//! implements it over hyper and additionally exposes the full connector
//! management API.
//!
//! # Error translation
//!
//! Every operation is single-shot (no caching, no retries) and maps
//! failures into [`ConnectError`]:
//!
//! ```text
//! connect / I/O failure      → Transport
//! per-request timeout        → DeadlineExceeded
//! HTTP 404                   → NotFound
//! other non-2xx              → Api { status, message }
//! undecodable response body  → Protocol
//! ```

pub mod api;
pub mod error;
pub mod rest;
pub mod types;

pub use api::{ApiFuture, ConnectApi};
pub use error::{ConnectError, ConnectResult};
pub use rest::{ClientOptions, HttpConnectClient};
pub use types::*;
