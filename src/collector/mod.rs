//! Collectors turning panel resources into gauges.
//!
//! Every [`CollectionTarget`] maps one upstream JSON shape onto the metric
//! sink. Targets are independent of each other; the scheduler runs each on
//! its own.
mod activity;
mod error;
mod models;
mod nodes;
mod panel;
mod system;
mod users;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use jiff::Timestamp;
use serde::de::DeserializeOwned;

pub use activity::{ActivityWindow, user_agent_family};
pub use error::{DecodeError, Error, Result};

use crate::client::Fetch;
use crate::metrics::{Gauge, MetricSink};
use crate::session::Credential;

/// A resource family of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum CollectionTarget {
    NodesStatus,
    NodesUsage,
    SystemStats,
    CoreStatus,
    UsersStats,
    OnlineCount,
    ServerStatus,
}

impl CollectionTarget {
    pub const ALL: [CollectionTarget; 7] = [
        CollectionTarget::NodesStatus,
        CollectionTarget::NodesUsage,
        CollectionTarget::SystemStats,
        CollectionTarget::CoreStatus,
        CollectionTarget::UsersStats,
        CollectionTarget::OnlineCount,
        CollectionTarget::ServerStatus,
    ];

    /// Upstream path; the users path is completed with `limit` and `offset`.
    pub fn path(self) -> &'static str {
        match self {
            CollectionTarget::NodesStatus => "/api/nodes",
            CollectionTarget::NodesUsage => "/api/nodes/usage",
            CollectionTarget::SystemStats => "/api/system",
            CollectionTarget::CoreStatus => "/api/core",
            CollectionTarget::UsersStats => "/api/users",
            CollectionTarget::OnlineCount => "/panel/api/inbounds/onlines",
            CollectionTarget::ServerStatus => "/panel/api/server/status",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectionTarget::NodesStatus => "nodes-status",
            CollectionTarget::NodesUsage => "nodes-usage",
            CollectionTarget::SystemStats => "system-stats",
            CollectionTarget::CoreStatus => "core-status",
            CollectionTarget::UsersStats => "users-stats",
            CollectionTarget::OnlineCount => "online-count",
            CollectionTarget::ServerStatus => "server-status",
        }
    }
}

impl fmt::Display for CollectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fetches targets through `F` and writes their gauges to a shared sink.
pub struct Collector<F> {
    fetcher: F,
    sink: Arc<dyn MetricSink>,
    activity: ActivityWindow,
    page_size: usize,
}

impl<F: Fetch> Collector<F> {
    pub fn new(
        fetcher: F,
        sink: Arc<dyn MetricSink>,
        activity: ActivityWindow,
        page_size: usize,
    ) -> Self {
        Self {
            fetcher,
            sink,
            activity,
            page_size: page_size.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches `target` once and sets its gauges.
    ///
    /// Returns the number of entities written. Gauges set before a failure
    /// keep their values; nothing is cleared.
    pub async fn collect(&self, target: CollectionTarget, credential: &Credential) -> Result<usize> {
        let sink = self.sink.as_ref();
        let record: fn(&[u8], &dyn MetricSink) -> std::result::Result<usize, DecodeError> =
            match target {
                CollectionTarget::UsersStats => {
                    let users = users::UsersPager {
                        fetcher: &self.fetcher,
                        credential,
                        sink,
                        activity: &self.activity,
                        now: Timestamp::now(),
                    };
                    return users.collect(self.page_size).await;
                }
                CollectionTarget::NodesStatus => nodes::record_status,
                CollectionTarget::NodesUsage => nodes::record_usage,
                CollectionTarget::SystemStats => system::record_stats,
                CollectionTarget::CoreStatus => system::record_core,
                CollectionTarget::OnlineCount => panel::record_online_count,
                CollectionTarget::ServerStatus => panel::record_server_status,
            };

        let body = self.fetcher.fetch(target.path(), credential).await?;
        record(&body, sink).map_err(|source| Error::Decode { target, source })
    }

    /// [`collect`](Self::collect) plus the exporter's own success and duration gauges.
    pub async fn run(&self, target: CollectionTarget, credential: &Credential) -> Result<usize> {
        let started = Instant::now();
        let outcome = self.collect(target, credential).await;
        let elapsed = started.elapsed().as_secs_f64();
        self.sink
            .set_gauge(Gauge::CollectorDuration, &[target.name()], elapsed);
        self.sink.set_gauge(
            Gauge::CollectorSuccess,
            &[target.name()],
            bool_gauge(outcome.is_ok()),
        );
        if let Ok(count) = &outcome {
            log::debug!("Collected {count} {target} entities in {elapsed:.3}s");
        }
        outcome
    }

    /// Marks a run that never started, e.g. because no credential was available.
    pub fn record_skipped(&self, target: CollectionTarget) {
        self.sink
            .set_gauge(Gauge::CollectorSuccess, &[target.name()], 0.0);
    }
}

fn bool_gauge(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Decodes each entity on its own, logging and skipping those that do not fit `T`.
fn decode_entities<T: DeserializeOwned>(raw: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entity) => Some(entity),
            Err(err) => {
                log::warn!("Skipping malformed {kind} #{index}: {err}");
                None
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::tz::TimeZone;

    use super::testing::FakeFetcher;
    use super::*;
    use crate::metrics::PrometheusSink;
    use crate::session::Secret;

    fn credential() -> Credential {
        Credential::issue(
            Secret::Bearer("token".into()),
            Timestamp::now(),
            Duration::from_secs(60),
            None,
        )
    }

    fn collector(fetcher: FakeFetcher) -> (Collector<FakeFetcher>, Arc<PrometheusSink>) {
        let sink = Arc::new(PrometheusSink::new("").unwrap());
        let activity = ActivityWindow::new(Duration::from_secs(120), TimeZone::UTC);
        let collector = Collector::new(fetcher, Arc::clone(&sink) as Arc<dyn MetricSink>, activity, 250);
        (collector, sink)
    }

    #[test]
    fn test_target_names_round_trip_through_clap() {
        use clap::ValueEnum;
        for target in CollectionTarget::ALL {
            assert_eq!(CollectionTarget::from_str(target.name(), false), Ok(target));
        }
    }

    #[tokio::test]
    async fn test_decode_failure_is_isolated_per_target() {
        let (collector, sink) = collector(FakeFetcher::routes(&[
            ("/api/nodes", "<html>Bad Gateway</html>"),
            ("/api/core", r#"{"version": "1.8.4", "started": true, "logs_websocket": "/api/core/logs"}"#),
        ]));
        let credential = credential();

        let err = collector
            .run(CollectionTarget::NodesStatus, &credential)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                target: CollectionTarget::NodesStatus,
                source: DecodeError::Json(_)
            }
        ));
        assert_eq!(
            collector
                .run(CollectionTarget::CoreStatus, &credential)
                .await
                .unwrap(),
            1
        );

        assert_eq!(sink.value(Gauge::CoreStarted, &["1.8.4"]), 1.0);
        assert_eq!(sink.value(Gauge::CollectorSuccess, &["nodes-status"]), 0.0);
        assert_eq!(sink.value(Gauge::CollectorSuccess, &["core-status"]), 1.0);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_stale_values() {
        let (collector, sink) = collector(FakeFetcher::routes(&[]));
        sink.set_gauge(Gauge::MemTotal, &[], 2048.0);

        let err = collector
            .run(CollectionTarget::SystemStats, &credential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!err.is_unauthorized());
        assert_eq!(sink.value(Gauge::MemTotal, &[]), 2048.0);
        assert_eq!(sink.value(Gauge::CollectorSuccess, &["system-stats"]), 0.0);
    }

    #[tokio::test]
    async fn test_record_skipped() {
        let (collector, sink) = collector(FakeFetcher::routes(&[]));
        collector.record_skipped(CollectionTarget::OnlineCount);
        assert!(
            sink.render()
                .unwrap()
                .contains(r#"exporter_collector_success{collector="online-count"} 0"#)
        );
    }

    #[test]
    fn test_decode_entities_skips_bad_entries() {
        let raw = serde_json::from_str(r#"[{"a": 1}, {"a": "x"}, {"a": 3}]"#).unwrap();
        #[derive(serde::Deserialize)]
        struct Entity {
            a: u32,
        }
        let decoded: Vec<Entity> = decode_entities(raw, "entity");
        assert_eq!(decoded.iter().map(|e| e.a).collect::<Vec<_>>(), vec![1, 3]);
    }
}
