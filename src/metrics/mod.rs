//! Gauge registry shared by the collectors and the exposition endpoint.
//!
//! Collectors only see the write side ([`MetricSink`]); the exposition
//! endpoint renders the [`PrometheusSink`] in Prometheus text format.
mod gauge;

use std::collections::HashMap;

pub use gauge::Gauge;
use prometheus::{GaugeVec, Opts, Registry, TextEncoder};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to register gauge `{name}`: {source}")]
    Register {
        name: &'static str,
        #[source]
        source: prometheus::Error,
    },
    #[error("failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Write-only view of the metric store.
pub trait MetricSink: Send + Sync {
    /// Overwrites the series of `gauge` identified by `label_values`.
    fn set_gauge(&self, gauge: Gauge, label_values: &[&str], value: f64);
}

/// [`MetricSink`] backed by a `prometheus` registry.
#[derive(Debug)]
pub struct PrometheusSink {
    registry: Registry,
    gauges: HashMap<Gauge, GaugeVec>,
}

impl PrometheusSink {
    /// Registers every [`Gauge`] under `namespace` (skipped when empty).
    pub fn new(namespace: &str) -> Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::with_capacity(Gauge::ALL.len());
        for gauge in Gauge::ALL {
            let mut opts = Opts::new(gauge.name(), gauge.help());
            if !namespace.is_empty() {
                opts = opts.namespace(namespace);
            }
            let register_err = |source| Error::Register {
                name: gauge.name(),
                source,
            };
            let vec = GaugeVec::new(opts, gauge.labels()).map_err(register_err)?;
            registry
                .register(Box::new(vec.clone()))
                .map_err(register_err)?;
            gauges.insert(gauge, vec);
        }

        Ok(Self { registry, gauges })
    }

    /// Renders all series that have been set at least once.
    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(Error::Encode)
    }

    /// Reads back a series, creating it with value 0 if it was never set.
    #[cfg(test)]
    pub(crate) fn value(&self, gauge: Gauge, label_values: &[&str]) -> f64 {
        self.gauges[&gauge].with_label_values(label_values).get()
    }
}

impl MetricSink for PrometheusSink {
    fn set_gauge(&self, gauge: Gauge, label_values: &[&str], value: f64) {
        let Some(vec) = self.gauges.get(&gauge) else {
            return;
        };
        match vec.get_metric_with_label_values(label_values) {
            Ok(series) => series.set(value),
            Err(err) => log::error!("failed to set gauge `{}`: {}", gauge.name(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let sink = PrometheusSink::new("test").unwrap();
        sink.set_gauge(Gauge::NodesUplink, &["1", "node-a"], 10.0);
        sink.set_gauge(Gauge::NodesUplink, &["1", "node-a"], 42.0);
        sink.set_gauge(Gauge::NodesUplink, &["2", "node-b"], 7.0);

        assert_eq!(sink.value(Gauge::NodesUplink, &["1", "node-a"]), 42.0);
        assert_eq!(sink.value(Gauge::NodesUplink, &["2", "node-b"]), 7.0);
    }

    #[test]
    fn test_unset_series_are_not_rendered() {
        let sink = PrometheusSink::new("test").unwrap();
        sink.set_gauge(Gauge::MemTotal, &[], 1024.0);
        let text = sink.render().unwrap();
        assert!(text.contains("test_panel_mem_total 1024"));
        assert!(!text.contains("test_nodes_uplink"));
    }

    #[test]
    fn test_wrong_label_count_is_ignored() {
        let sink = PrometheusSink::new("test").unwrap();
        sink.set_gauge(Gauge::NodesUplink, &["only-one"], 1.0);
        assert!(!sink.render().unwrap().contains("test_nodes_uplink"));
    }

    #[test]
    fn test_render_uses_namespace() {
        let sink = PrometheusSink::new("marzban").unwrap();
        sink.set_gauge(Gauge::CoreStarted, &["1.8.4"], 1.0);
        let text = sink.render().unwrap();
        assert!(text.contains("# TYPE marzban_core_started gauge"));
        assert!(text.contains("marzban_core_started{version=\"1.8.4\"} 1"));
    }
}
