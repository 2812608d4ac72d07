//! Cluster collector — one full snapshot of connector and task states.
//!
//! Discovery is a single sequential call; per-connector status queries
//! then fan out on a `JoinSet`, one task per connector. Results are merged
//! by the caller once the set drains (or the deadline passes), so the
//! fan-out itself shares no mutable state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::timeout_at;
use tracing::{debug, warn};

use connect_client::{ConnectApi, ConnectError, ConnectResult, ConnectorName, ConnectorStatus};

use crate::snapshot::ClusterSnapshot;

type StatusOutcome = (ConnectorName, ConnectResult<ConnectorStatus>);

/// Produces [`ClusterSnapshot`]s from a Connect cluster.
///
/// Stateless between runs; `run()` may be called concurrently.
pub struct ClusterCollector {
    client: Arc<dyn ConnectApi>,
    /// Upper bound for one whole run.
    deadline: Option<Duration>,
}

impl ClusterCollector {
    pub fn new(client: Arc<dyn ConnectApi>) -> Self {
        Self {
            client,
            deadline: None,
        }
    }

    /// Bound every run by `deadline`. Status queries still in flight when
    /// it expires are abandoned and their connectors omitted.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Collect one snapshot. Never fails: an unreachable cluster yields
    /// [`ClusterSnapshot::down`].
    pub async fn run(&self) -> ClusterSnapshot {
        let started = Instant::now();
        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);

        let names = match self.discover(deadline).await {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    error = %e,
                    transport = e.is_transport(),
                    "connector discovery failed, reporting cluster down"
                );
                return ClusterSnapshot::down();
            }
        };

        let mut snapshot = ClusterSnapshot::discovered(&names);
        for (name, status) in self.fan_out(names, deadline).await {
            snapshot.absorb(&name, &status);
        }

        debug!(
            connectors = snapshot.connector_count,
            observed = snapshot.connectors.len(),
            omitted = snapshot.unobserved(),
            tasks = snapshot.tasks.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cluster snapshot collected"
        );
        snapshot
    }

    async fn discover(
        &self,
        deadline: Option<tokio::time::Instant>,
    ) -> ConnectResult<Vec<ConnectorName>> {
        match (deadline, self.deadline) {
            (Some(at), Some(budget)) => timeout_at(at, self.client.list_connectors())
                .await
                .map_err(|_| ConnectError::DeadlineExceeded(budget))?,
            _ => self.client.list_connectors().await,
        }
    }

    /// Query every connector's status concurrently and keep the successes.
    async fn fan_out(
        &self,
        names: Vec<ConnectorName>,
        deadline: Option<tokio::time::Instant>,
    ) -> Vec<(ConnectorName, ConnectorStatus)> {
        let mut pending: JoinSet<StatusOutcome> = JoinSet::new();
        for name in names {
            let client = Arc::clone(&self.client);
            pending.spawn(async move {
                let result = client.connector_status(&name).await;
                (name, result)
            });
        }

        let mut statuses = Vec::with_capacity(pending.len());
        loop {
            let joined = match deadline {
                Some(at) => match timeout_at(at, pending.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(
                            abandoned = pending.len(),
                            "collection deadline reached, abandoning status queries"
                        );
                        pending.abort_all();
                        break;
                    }
                },
                None => pending.join_next().await,
            };

            let Some(joined) = joined else { break };
            match joined {
                Ok((name, Ok(status))) => statuses.push((name, status)),
                Ok((name, Err(e))) => {
                    warn!(connector = %name, error = %e, "connector status query failed, omitting");
                }
                Err(e) => {
                    warn!(error = %e, "connector status task did not complete, omitting");
                }
            }
        }
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use connect_client::{ApiFuture, ConnectorState, TaskStatus};

    use crate::snapshot::TaskKey;
    use crate::state::EncodedState;

    /// In-memory cluster double.
    #[derive(Default)]
    struct FakeCluster {
        /// `None` makes discovery fail.
        names: Option<Vec<String>>,
        statuses: HashMap<String, ConnectorStatus>,
        /// Connectors whose status query never completes.
        stalled: Vec<String>,
        status_calls: AtomicUsize,
    }

    impl FakeCluster {
        fn listing(names: &[&str]) -> Self {
            Self {
                names: Some(names.iter().map(|n| n.to_string()).collect()),
                ..Self::default()
            }
        }

        fn with_status(mut self, status: ConnectorStatus) -> Self {
            self.statuses.insert(status.name.clone(), status);
            self
        }

        fn with_stalled(mut self, name: &str) -> Self {
            self.stalled.push(name.to_string());
            self
        }
    }

    impl ConnectApi for FakeCluster {
        fn list_connectors(&self) -> ApiFuture<'_, Vec<String>> {
            Box::pin(async move {
                self.names
                    .clone()
                    .ok_or_else(|| ConnectError::Transport("connection refused".into()))
            })
        }

        fn connector_status<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ConnectorStatus> {
            Box::pin(async move {
                self.status_calls.fetch_add(1, Ordering::SeqCst);
                if self.stalled.iter().any(|s| s == name) {
                    std::future::pending::<()>().await;
                }
                self.statuses
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConnectError::NotFound(name.to_string()))
            })
        }
    }

    fn status(name: &str, state: &str, worker: &str, tasks: &[(u32, &str, &str)]) -> ConnectorStatus {
        ConnectorStatus {
            name: name.to_string(),
            connector: ConnectorState {
                state: state.to_string(),
                worker_id: worker.to_string(),
            },
            tasks: tasks
                .iter()
                .map(|(id, state, worker)| TaskStatus {
                    id: *id,
                    state: state.to_string(),
                    worker_id: worker.to_string(),
                    trace: None,
                })
                .collect(),
        }
    }

    fn collector(cluster: FakeCluster) -> ClusterCollector {
        ClusterCollector::new(Arc::new(cluster))
    }

    #[tokio::test]
    async fn discovery_failure_reports_down() {
        let snap = collector(FakeCluster::default()).run().await;
        assert_eq!(snap, ClusterSnapshot::down());
    }

    #[tokio::test]
    async fn empty_cluster_is_up() {
        let snap = collector(FakeCluster::listing(&[])).run().await;
        assert!(snap.up);
        assert_eq!(snap.connector_count, 0);
        assert!(snap.connectors.is_empty());
    }

    #[tokio::test]
    async fn one_failed_status_is_omitted() {
        let cluster = FakeCluster::listing(&["a", "b", "c"])
            .with_status(status("a", "RUNNING", "w1", &[]))
            .with_status(status("c", "PAUSED", "w2", &[]));

        let snap = collector(cluster).run().await;
        assert!(snap.up);
        assert_eq!(snap.connector_count, 3);
        assert_eq!(snap.connectors.len(), 2);
        assert!(!snap.connectors.contains_key("b"));
        assert_eq!(snap.unobserved(), 1);
    }

    #[tokio::test]
    async fn panicking_status_query_is_omitted() {
        struct ExplodingCluster;

        impl ConnectApi for ExplodingCluster {
            fn list_connectors(&self) -> ApiFuture<'_, Vec<String>> {
                Box::pin(async { Ok(vec!["ok".to_string(), "boom".to_string()]) })
            }

            fn connector_status<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ConnectorStatus> {
                Box::pin(async move {
                    assert_ne!(name, "boom", "status handler exploded");
                    Ok(status(name, "RUNNING", "w1", &[(0, "RUNNING", "w1")]))
                })
            }
        }

        let snap = ClusterCollector::new(Arc::new(ExplodingCluster)).run().await;
        assert!(snap.up);
        assert_eq!(snap.connector_count, 2);
        assert_eq!(snap.connectors.len(), 1);
        assert!(snap.connectors.contains_key("ok"));
        assert!(snap.is_listed("boom"));
        assert_eq!(snap.tasks.len(), 1);
    }

    #[tokio::test]
    async fn task_states_are_encoded() {
        let cluster = FakeCluster::listing(&["c1"]).with_status(status(
            "c1",
            "RUNNING",
            "w1",
            &[(0, "running", "w1"), (1, "unassigned", "w1"), (2, "paused", "w2")],
        ));

        let snap = collector(cluster).run().await;
        assert_eq!(snap.tasks.len(), 3);
        let encoded: Vec<EncodedState> = (0..3)
            .map(|id| snap.tasks[&TaskKey::new("c1", id)].encoded)
            .collect();
        assert_eq!(
            encoded,
            vec![EncodedState::Running, EncodedState::Unassigned, EncodedState::Paused]
        );
        assert_eq!(snap.tasks[&TaskKey::new("c1", 2)].worker_id, "w2");
    }

    #[tokio::test]
    async fn partial_cluster_scenario() {
        let cluster = FakeCluster::listing(&["c1", "c2"])
            .with_status(status("c1", "running", "w1", &[(0, "running", "w1")]));

        let snap = collector(cluster).run().await;
        assert!(snap.up);
        assert_eq!(snap.connector_count, 2);

        assert_eq!(snap.connectors.len(), 1);
        let c1 = &snap.connectors["c1"];
        assert_eq!((c1.encoded, c1.label.as_str(), c1.worker_id.as_str()), (EncodedState::Running, "running", "w1"));

        assert_eq!(snap.tasks.len(), 1);
        let t0 = &snap.tasks[&TaskKey::new("c1", 0)];
        assert_eq!((t0.encoded, t0.label.as_str(), t0.worker_id.as_str()), (EncodedState::Running, "running", "w1"));
    }

    #[tokio::test]
    async fn every_listed_connector_is_queried_once() {
        let names: Vec<String> = (0..25).map(|i| format!("conn-{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut cluster = FakeCluster::listing(&refs);
        for name in &names {
            cluster = cluster.with_status(status(name, "RUNNING", "w1", &[(0, "RUNNING", "w1")]));
        }
        let cluster = Arc::new(cluster);

        let snap = ClusterCollector::new(cluster.clone()).run().await;
        assert_eq!(snap.connectors.len(), 25);
        assert_eq!(snap.tasks.len(), 25);
        assert_eq!(cluster.status_calls.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn overlapping_runs_are_independent() {
        let cluster = FakeCluster::listing(&["a", "b"])
            .with_status(status("a", "RUNNING", "w1", &[(0, "RUNNING", "w1")]))
            .with_status(status("b", "FAILED", "w2", &[(0, "FAILED", "w2"), (1, "RUNNING", "w2")]));
        let collector = Arc::new(collector(cluster));

        let (first, second) = tokio::join!(collector.run(), collector.run());
        assert_eq!(first, second);
        for snap in [&first, &second] {
            assert_eq!(snap.connectors.len(), 2);
            assert_eq!(snap.tasks.len(), 3);
            assert!(snap.tasks.keys().all(|k| snap.connectors.contains_key(&k.connector)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_abandons_stalled_queries() {
        let cluster = FakeCluster::listing(&["fast", "stuck"])
            .with_status(status("fast", "RUNNING", "w1", &[(0, "RUNNING", "w1")]))
            .with_stalled("stuck");

        let snap = collector(cluster)
            .with_deadline(Duration::from_secs(2))
            .run()
            .await;

        assert!(snap.up);
        assert_eq!(snap.connector_count, 2);
        assert_eq!(snap.connectors.len(), 1);
        assert!(snap.connectors.contains_key("fast"));
        assert!(!snap.tasks.keys().any(|k| k.connector == "stuck"));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_during_discovery_reports_down() {
        struct HangingCluster;

        impl ConnectApi for HangingCluster {
            fn list_connectors(&self) -> ApiFuture<'_, Vec<String>> {
                Box::pin(async {
                    std::future::pending::<()>().await;
                    Ok(Vec::new())
                })
            }

            fn connector_status<'a>(&'a self, name: &'a str) -> ApiFuture<'a, ConnectorStatus> {
                Box::pin(async move { Err(ConnectError::NotFound(name.to_string())) })
            }
        }

        let snap = ClusterCollector::new(Arc::new(HangingCluster))
            .with_deadline(Duration::from_secs(1))
            .run()
            .await;
        assert_eq!(snap, ClusterSnapshot::down());
    }
}
