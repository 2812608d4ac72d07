//! The capability set the metrics collector needs from a Connect cluster.
//!
//! Kept deliberately small so tests can substitute an in-memory double.

use std::future::Future;
use std::pin::Pin;

use crate::error::ConnectResult;
use crate::types::{ConnectorName, ConnectorStatus};

/// Boxed future alias for Connect API results.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ConnectResult<T>> + Send + 'a>>;

/// Read-only view of a Connect cluster: discovery plus per-connector status.
pub trait ConnectApi: Send + Sync {
    /// List the names of all deployed connectors.
    fn list_connectors(&self) -> ApiFuture<'_, Vec<ConnectorName>>;

    /// Fetch the connector and task states for one connector.
    fn connector_status<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ConnectorStatus>;
}
