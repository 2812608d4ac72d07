//! Wire types for the Kafka Connect REST API.
//!
//! Field names follow the JSON the Connect workers emit (`worker_id`,
//! `connector.class`, `error_count`, ...), so these types deserialize
//! responses directly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of a connector, unique within a cluster.
pub type ConnectorName = String;

/// Connector configuration: property name → value.
///
/// Workers return every value as a string but accept arbitrary JSON.
pub type ConnectorConfig = HashMap<String, serde_json::Value>;

// ── Status ─────────────────────────────────────────────────────────

/// Response of `GET /connectors/{name}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorStatus {
    pub name: ConnectorName,
    pub connector: ConnectorState,
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
}

/// State of the connector instance itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorState {
    /// State label, e.g. "RUNNING" or "PAUSED". Open set.
    pub state: String,
    pub worker_id: String,
}

/// State of one task belonging to a connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub id: u32,
    pub state: String,
    pub worker_id: String,
    /// Stack trace reported for failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

// ── Connector management ───────────────────────────────────────────

/// Whether a connector reads into or writes out of Kafka.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    Source,
    Sink,
    #[serde(other)]
    Unknown,
}

/// Response of `GET /connectors/{name}` and connector create/update calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorInfo {
    pub name: ConnectorName,
    #[serde(default)]
    pub config: ConnectorConfig,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConnectorType>,
}

/// Identifies a task: owning connector plus its task number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskId {
    pub connector: ConnectorName,
    pub task: u32,
}

/// Request body of `POST /connectors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewConnector {
    pub name: ConnectorName,
    /// Must contain `connector.class`.
    pub config: ConnectorConfig,
}

impl NewConnector {
    /// Build a creation request for the given connector class.
    pub fn new(name: impl Into<String>, connector_class: impl Into<String>) -> Self {
        let mut config = ConnectorConfig::new();
        config.insert(
            "connector.class".to_string(),
            serde_json::Value::String(connector_class.into()),
        );
        Self {
            name: name.into(),
            config,
        }
    }

    /// Add a configuration property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// The configured `connector.class`, if any.
    pub fn connector_class(&self) -> Option<&str> {
        self.config.get("connector.class").and_then(|v| v.as_str())
    }
}

// ── Plugins ────────────────────────────────────────────────────────

/// One entry of `GET /connector-plugins`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectorPlugin {
    pub class: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Response of `PUT /connector-plugins/{plugin}/config/validate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigValidation {
    pub name: String,
    pub error_count: u32,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Per-property definition and validation result, kept as raw JSON.
    #[serde(default)]
    pub configs: Vec<serde_json::Value>,
}

/// Error body returned by Connect workers on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
