//! connect-metrics — observability for a Kafka Connect cluster.
//!
//! Collects a point-in-time snapshot of every connector and task state,
//! encodes state labels into small integers, and renders the result in
//! the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! ClusterCollector::run()
//!   ├── ConnectApi::list_connectors()      ← failure ⇒ snapshot marked down
//!   ├── ConnectApi::connector_status() ×N  ← concurrent, failures omitted
//!   └── EncodedState::encode() → ClusterSnapshot
//!
//! MetricsSink
//!   ├── record(&ClusterSnapshot) → overwrite gauges in place
//!   └── render() → text/plain for /metrics endpoint
//! ```

pub mod collector;
pub mod prometheus;
pub mod snapshot;
pub mod state;

pub use collector::ClusterCollector;
pub use prometheus::MetricsSink;
pub use snapshot::{ClusterSnapshot, StateObservation, TaskKey};
pub use state::EncodedState;
