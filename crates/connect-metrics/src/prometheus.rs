//! Prometheus text exposition.
//!
//! [`MetricsSink`] holds the exported gauges. Each recorded snapshot
//! overwrites them in place; rendering produces the text format a
//! Prometheus server scrapes.

use std::collections::BTreeMap;
use std::fmt::Write;

use tokio::sync::RwLock;
use tracing::debug;

use crate::snapshot::{ClusterSnapshot, StateObservation};

/// Content type of [`MetricsSink::render`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const CONNECTOR_RUNNING: &str = "kafka_connect_connector_state_running";
const TASKS_STATE: &str = "kafka_connect_connector_tasks_state";
const UP: &str = "kafka_connect_up";
const CONNECTORS_COUNT: &str = "kafka_connect_connectors_count";

/// Exported series for one connector.
#[derive(Debug, Clone)]
struct ConnectorSeries {
    connector: StateObservation,
    tasks: BTreeMap<u32, StateObservation>,
}

#[derive(Debug, Default)]
struct Gauges {
    up: bool,
    connector_count: usize,
    connectors: BTreeMap<String, ConnectorSeries>,
}

/// Gauge store shared by all scrapes.
///
/// Created once at startup and injected into the scrape endpoint.
/// Overlapping scrapes may interleave; the last write per connector wins.
#[derive(Debug, Default)]
pub struct MetricsSink {
    gauges: RwLock<Gauges>,
}

impl MetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite gauges from a snapshot.
    ///
    /// Connectors observed in the snapshot have all their series replaced.
    /// Connectors the cluster no longer lists are dropped. Listed connectors
    /// whose status is missing keep their last exported series. When the
    /// snapshot is down only `kafka_connect_up` changes.
    pub async fn record(&self, snapshot: &ClusterSnapshot) {
        let mut gauges = self.gauges.write().await;
        gauges.up = snapshot.up;
        if !snapshot.up {
            debug!("recorded cluster down");
            return;
        }

        gauges.connector_count = snapshot.connector_count;

        let before = gauges.connectors.len();
        gauges.connectors.retain(|name, _| snapshot.is_listed(name));
        let evicted = before - gauges.connectors.len();

        let mut tasks = snapshot.tasks_by_connector();
        for (name, observation) in &snapshot.connectors {
            let series = ConnectorSeries {
                connector: observation.clone(),
                tasks: tasks
                    .remove(name.as_str())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(id, obs)| (id, obs.clone()))
                    .collect(),
            };
            gauges.connectors.insert(name.clone(), series);
        }
        debug!(
            observed = snapshot.connectors.len(),
            evicted,
            exported = gauges.connectors.len(),
            "recorded cluster snapshot"
        );
    }

    /// Render all gauges in Prometheus text format.
    pub async fn render(&self) -> String {
        let gauges = self.gauges.read().await;
        let mut out = String::new();

        header(&mut out, CONNECTOR_RUNNING, "is the connector running?");
        for (name, series) in &gauges.connectors {
            let running = if series.connector.encoded.is_running() { 1 } else { 0 };
            let _ = writeln!(
                out,
                "{CONNECTOR_RUNNING}{{connector=\"{}\",state=\"{}\",worker=\"{}\"}} {running}",
                escape(name),
                escape(&series.connector.label),
                escape(&series.connector.worker_id),
            );
        }

        header(
            &mut out,
            TASKS_STATE,
            "the state of tasks. 0-failed, 1-running, 2-unassigned, 3-paused",
        );
        for (name, series) in &gauges.connectors {
            for (id, task) in &series.tasks {
                let _ = writeln!(
                    out,
                    "{TASKS_STATE}{{connector=\"{}\",state=\"{}\",worker_id=\"{}\",id=\"{id}\"}} {}",
                    escape(name),
                    escape(&task.label),
                    escape(&task.worker_id),
                    task.encoded.as_gauge(),
                );
            }
        }

        header(&mut out, UP, "was the last scrape of kafka connect successful?");
        let _ = writeln!(out, "{UP} {}", u8::from(gauges.up));

        header(&mut out, CONNECTORS_COUNT, "number of deployed connectors");
        let _ = writeln!(out, "{CONNECTORS_COUNT} {}", gauges.connector_count);

        out
    }
}

fn header(out: &mut String, name: &str, help: &str) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} gauge");
}

/// Escape a label value per the exposition format.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
