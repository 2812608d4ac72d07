//! Point-in-time view of a Connect cluster.
//!
//! Built fresh by every collection run and handed to the metrics sink;
//! nothing here is cached across runs.

use std::collections::{BTreeMap, HashMap, HashSet};

use connect_client::{ConnectorName, ConnectorStatus};

use crate::state::{normalize_label, EncodedState};

/// One observed state: encoded value, lowercase label, and reporting worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateObservation {
    pub encoded: EncodedState,
    pub label: String,
    pub worker_id: String,
}

impl StateObservation {
    pub fn observe(label: &str, worker_id: &str) -> Self {
        Self {
            encoded: EncodedState::encode(label),
            label: normalize_label(label),
            worker_id: worker_id.to_string(),
        }
    }
}

/// Identifies a task within the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskKey {
    pub connector: ConnectorName,
    pub task_id: u32,
}

impl TaskKey {
    pub fn new(connector: &str, task_id: u32) -> Self {
        Self {
            connector: connector.to_string(),
            task_id,
        }
    }
}

/// Result of one collection run.
///
/// When `up` is false the cluster could not be listed and every other
/// field is empty. `listed` can be larger than `connectors`: it also
/// holds connectors whose status could not be fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSnapshot {
    /// Whether connector discovery succeeded.
    pub up: bool,
    /// Number of connectors the cluster listed, including ones whose
    /// status could not be fetched.
    pub connector_count: usize,
    /// Names the cluster listed.
    pub listed: HashSet<ConnectorName>,
    /// Connector name → connector state.
    pub connectors: HashMap<ConnectorName, StateObservation>,
    /// (connector, task id) → task state.
    pub tasks: HashMap<TaskKey, StateObservation>,
}

impl ClusterSnapshot {
    /// The fail-safe result: cluster down, nothing observed.
    pub fn down() -> Self {
        Self::default()
    }

    /// A reachable cluster listing `names`, none observed yet.
    pub fn discovered<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            up: true,
            connector_count: names.len(),
            listed: names.iter().map(|n| n.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    /// Whether the cluster listed `name` in this run.
    pub fn is_listed(&self, name: &str) -> bool {
        self.listed.contains(name)
    }

    /// Fold one connector's status into the snapshot under `name`.
    pub fn absorb(&mut self, name: &str, status: &ConnectorStatus) {
        self.connectors.insert(
            name.to_string(),
            StateObservation::observe(&status.connector.state, &status.connector.worker_id),
        );
        for task in &status.tasks {
            self.tasks.insert(
                TaskKey::new(name, task.id),
                StateObservation::observe(&task.state, &task.worker_id),
            );
        }
    }

    /// Observed tasks grouped by connector, ordered by task id.
    pub fn tasks_by_connector(&self) -> HashMap<&str, BTreeMap<u32, &StateObservation>> {
        let mut grouped: HashMap<&str, BTreeMap<u32, &StateObservation>> = HashMap::new();
        for (key, obs) in &self.tasks {
            grouped
                .entry(key.connector.as_str())
                .or_default()
                .insert(key.task_id, obs);
        }
        grouped
    }

    /// Listed connectors whose status is missing from this snapshot.
    pub fn unobserved(&self) -> usize {
        self.connector_count.saturating_sub(self.connectors.len())
    }
}
