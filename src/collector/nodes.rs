use super::error::DecodeError;
use super::models::{Node, NodeUsage, UsagesPage};
use super::{bool_gauge, decode_entities};
use crate::metrics::{Gauge, MetricSink};

/// Sets one status series per node; only `"connected"` counts as up.
pub(super) fn record_status(body: &[u8], sink: &dyn MetricSink) -> Result<usize, DecodeError> {
    let raw: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    let nodes = decode_entities::<Node>(raw, "node");
    for node in &nodes {
        let id = node.id.unwrap_or(0).to_string();
        let coefficient = node
            .usage_coefficient
            .map(|c| c.to_string())
            .unwrap_or_default();
        let status = node.status.as_deref().unwrap_or("");
        sink.set_gauge(
            Gauge::NodesStatus,
            &[
                &node.name,
                node.address.as_deref().unwrap_or(""),
                &id,
                &coefficient,
                node.xray_version.as_deref().unwrap_or(""),
                status,
            ],
            bool_gauge(status == "connected"),
        );
    }
    Ok(nodes.len())
}

/// Sets uplink and downlink per node; the master node has no id and is labeled `0`.
pub(super) fn record_usage(body: &[u8], sink: &dyn MetricSink) -> Result<usize, DecodeError> {
    let page: UsagesPage = serde_json::from_slice(body)?;
    let usages = decode_entities::<NodeUsage>(page.usages, "node usage");
    for usage in &usages {
        let id = usage.node_id.map_or_else(|| "0".to_owned(), |id| id.to_string());
        let labels = [id.as_str(), usage.node_name.as_str()];
        sink.set_gauge(Gauge::NodesUplink, &labels, usage.uplink);
        sink.set_gauge(Gauge::NodesDownlink, &labels, usage.downlink);
    }
    Ok(usages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PrometheusSink;

    #[test]
    fn test_node_status() {
        let sink = PrometheusSink::new("").unwrap();
        let body = br#"[
            {"id": 1, "name": "de-1", "address": "10.0.0.1", "port": 62050, "api_port": 62051,
             "usage_coefficient": 1.0, "xray_version": "1.8.4", "status": "connected", "message": null},
            {"id": 2, "name": "nl-1", "address": "10.0.0.2", "usage_coefficient": 1.5,
             "xray_version": null, "status": "error", "message": "timeout"},
            {"id": 3, "name": "fi-1", "address": "10.0.0.3", "status": ""}
        ]"#;

        assert_eq!(record_status(body, &sink).unwrap(), 3);
        assert_eq!(
            sink.value(
                Gauge::NodesStatus,
                &["de-1", "10.0.0.1", "1", "1", "1.8.4", "connected"]
            ),
            1.0
        );
        let text = sink.render().unwrap();
        assert!(text.contains(
            r#"nodes_status{address="10.0.0.2",id="2",name="nl-1",status="error",usage_coefficient="1.5",xray_version=""} 0"#
        ));
        assert!(text.contains(
            r#"nodes_status{address="10.0.0.3",id="3",name="fi-1",status="",usage_coefficient="",xray_version=""} 0"#
        ));
    }

    #[test]
    fn test_node_status_skips_malformed_node() {
        let sink = PrometheusSink::new("").unwrap();
        let body = br#"[
            {"id": 1, "status": "connected"},
            {"id": 2, "name": "ok", "status": "connected"}
        ]"#;
        assert_eq!(record_status(body, &sink).unwrap(), 1);
        assert_eq!(
            sink.value(Gauge::NodesStatus, &["ok", "", "2", "", "", "connected"]),
            1.0
        );
    }

    #[test]
    fn test_node_status_rejects_non_array() {
        let sink = PrometheusSink::new("").unwrap();
        let err = record_status(br#"{"detail": "Not authenticated"}"#, &sink).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_usage_with_null_node_id() {
        let sink = PrometheusSink::new("").unwrap();
        let body = br#"{"usages": [
            {"node_id": null, "node_name": "Master", "uplink": 1000, "downlink": 2000},
            {"node_id": 4, "node_name": "de-1", "uplink": 30.5, "downlink": 40}
        ]}"#;

        assert_eq!(record_usage(body, &sink).unwrap(), 2);
        assert_eq!(sink.value(Gauge::NodesUplink, &["0", "Master"]), 1000.0);
        assert_eq!(sink.value(Gauge::NodesDownlink, &["0", "Master"]), 2000.0);
        assert_eq!(sink.value(Gauge::NodesUplink, &["4", "de-1"]), 30.5);
        assert_eq!(sink.value(Gauge::NodesDownlink, &["4", "de-1"]), 40.0);
    }
}
