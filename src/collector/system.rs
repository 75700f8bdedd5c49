use super::bool_gauge;
use super::error::DecodeError;
use super::models::{CoreStatus, SystemStats};
use crate::metrics::{Gauge, MetricSink};

/// Sets one unlabeled gauge per reported field; absent fields keep their last value.
pub(super) fn record_stats(body: &[u8], sink: &dyn MetricSink) -> Result<usize, DecodeError> {
    let stats: SystemStats = serde_json::from_slice(body)?;
    let fields = [
        (Gauge::MemTotal, stats.mem_total),
        (Gauge::MemUsed, stats.mem_used),
        (Gauge::CpuCores, stats.cpu_cores),
        (Gauge::CpuUsage, stats.cpu_usage),
        (Gauge::TotalUsers, stats.total_user),
        (Gauge::UsersActive, stats.users_active),
        (Gauge::UsersOnline, stats.online_users),
        (Gauge::UsersOnHold, stats.users_on_hold),
        (Gauge::UsersDisabled, stats.users_disabled),
        (Gauge::UsersExpired, stats.users_expired),
        (Gauge::UsersLimited, stats.users_limited),
        (Gauge::IncomingBandwidth, stats.incoming_bandwidth),
        (Gauge::OutgoingBandwidth, stats.outgoing_bandwidth),
        (Gauge::IncomingBandwidthSpeed, stats.incoming_bandwidth_speed),
        (Gauge::OutgoingBandwidthSpeed, stats.outgoing_bandwidth_speed),
    ];

    let mut written = 0;
    for (gauge, value) in fields {
        if let Some(value) = value {
            sink.set_gauge(gauge, &[], value);
            written += 1;
        }
    }
    Ok(written)
}

pub(super) fn record_core(body: &[u8], sink: &dyn MetricSink) -> Result<usize, DecodeError> {
    let core: CoreStatus = serde_json::from_slice(body)?;
    sink.set_gauge(
        Gauge::CoreStarted,
        &[core.version.as_deref().unwrap_or("")],
        bool_gauge(core.started),
    );
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PrometheusSink;

    #[test]
    fn test_system_stats() {
        let sink = PrometheusSink::new("").unwrap();
        let body = br#"{
            "version": "0.4.9", "mem_total": 4102545408, "mem_used": 1634283520,
            "cpu_cores": 2, "cpu_usage": 12.5, "total_user": 40, "users_active": 31,
            "incoming_bandwidth": 1000, "outgoing_bandwidth": 2000,
            "incoming_bandwidth_speed": 10, "outgoing_bandwidth_speed": 20
        }"#;

        assert_eq!(record_stats(body, &sink).unwrap(), 10);
        assert_eq!(sink.value(Gauge::MemTotal, &[]), 4102545408.0);
        assert_eq!(sink.value(Gauge::CpuUsage, &[]), 12.5);
        assert_eq!(sink.value(Gauge::TotalUsers, &[]), 40.0);
        assert_eq!(sink.value(Gauge::OutgoingBandwidthSpeed, &[]), 20.0);
        assert!(!sink.render().unwrap().contains("panel_users_on_hold"));
    }

    #[test]
    fn test_system_stats_extended_counters() {
        let sink = PrometheusSink::new("").unwrap();
        let body = br#"{"online_users": 3, "users_on_hold": 1, "users_disabled": 2,
                        "users_expired": 4, "users_limited": null}"#;

        assert_eq!(record_stats(body, &sink).unwrap(), 4);
        assert_eq!(sink.value(Gauge::UsersOnline, &[]), 3.0);
        assert_eq!(sink.value(Gauge::UsersExpired, &[]), 4.0);
        assert!(!sink.render().unwrap().contains("panel_users_limited"));
    }

    #[test]
    fn test_core_status() {
        let sink = PrometheusSink::new("").unwrap();
        record_core(br#"{"version": "1.8.4", "started": true}"#, &sink).unwrap();
        assert_eq!(sink.value(Gauge::CoreStarted, &["1.8.4"]), 1.0);

        record_core(br#"{"version": null, "started": false}"#, &sink).unwrap();
        assert!(
            sink.render()
                .unwrap()
                .contains(r#"core_started{version=""} 0"#)
        );
    }

    #[test]
    fn test_core_status_requires_started() {
        let sink = PrometheusSink::new("").unwrap();
        let err = record_core(br#"{"version": "1.8.4"}"#, &sink).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
