const NODE_STATUS_LABELS: &[&str] = &[
    "name",
    "address",
    "id",
    "usage_coefficient",
    "xray_version",
    "status",
];
const NODE_USAGE_LABELS: &[&str] = &["id", "name"];
const USER_LABELS: &[&str] = &[
    "data_limit_reset_strategy",
    "note",
    "username",
    "status",
    "last_user_agent",
];
const USER_ONLINE_LABELS: &[&str] = &["note", "username", "status", "last_user_agent"];
const VERSION_LABELS: &[&str] = &["version"];
const COLLECTOR_LABELS: &[&str] = &["collector"];
const NO_LABELS: &[&str] = &[];

/// Every gauge the exporter publishes.
///
/// The label names of a gauge never change at runtime; collectors pass label
/// values in the order returned by [`Gauge::labels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gauge {
    NodesStatus,
    NodesUplink,
    NodesDownlink,
    UserDataLimit,
    UserUsedTraffic,
    UserLifetimeUsedTraffic,
    UserExpirationDate,
    UserOnline,
    CoreStarted,
    MemTotal,
    MemUsed,
    CpuCores,
    CpuUsage,
    TotalUsers,
    UsersActive,
    UsersOnline,
    UsersOnHold,
    UsersDisabled,
    UsersExpired,
    UsersLimited,
    IncomingBandwidth,
    OutgoingBandwidth,
    IncomingBandwidthSpeed,
    OutgoingBandwidthSpeed,
    OnlineUsersCount,
    XrayVersion,
    CollectorSuccess,
    CollectorDuration,
}

impl Gauge {
    pub const ALL: [Gauge; 28] = [
        Gauge::NodesStatus,
        Gauge::NodesUplink,
        Gauge::NodesDownlink,
        Gauge::UserDataLimit,
        Gauge::UserUsedTraffic,
        Gauge::UserLifetimeUsedTraffic,
        Gauge::UserExpirationDate,
        Gauge::UserOnline,
        Gauge::CoreStarted,
        Gauge::MemTotal,
        Gauge::MemUsed,
        Gauge::CpuCores,
        Gauge::CpuUsage,
        Gauge::TotalUsers,
        Gauge::UsersActive,
        Gauge::UsersOnline,
        Gauge::UsersOnHold,
        Gauge::UsersDisabled,
        Gauge::UsersExpired,
        Gauge::UsersLimited,
        Gauge::IncomingBandwidth,
        Gauge::OutgoingBandwidth,
        Gauge::IncomingBandwidthSpeed,
        Gauge::OutgoingBandwidthSpeed,
        Gauge::OnlineUsersCount,
        Gauge::XrayVersion,
        Gauge::CollectorSuccess,
        Gauge::CollectorDuration,
    ];

    /// Metric name without the namespace prefix.
    pub fn name(self) -> &'static str {
        match self {
            Gauge::NodesStatus => "nodes_status",
            Gauge::NodesUplink => "nodes_uplink",
            Gauge::NodesDownlink => "nodes_downlink",
            Gauge::UserDataLimit => "user_data_limit",
            Gauge::UserUsedTraffic => "user_used_traffic",
            Gauge::UserLifetimeUsedTraffic => "user_lifetime_used_traffic",
            Gauge::UserExpirationDate => "user_expiration_date",
            Gauge::UserOnline => "user_online",
            Gauge::CoreStarted => "core_started",
            Gauge::MemTotal => "panel_mem_total",
            Gauge::MemUsed => "panel_mem_used",
            Gauge::CpuCores => "panel_cpu_cores",
            Gauge::CpuUsage => "panel_cpu_usage",
            Gauge::TotalUsers => "panel_total_users",
            Gauge::UsersActive => "panel_users_active",
            Gauge::UsersOnline => "panel_users_online",
            Gauge::UsersOnHold => "panel_users_on_hold",
            Gauge::UsersDisabled => "panel_users_disabled",
            Gauge::UsersExpired => "panel_users_expired",
            Gauge::UsersLimited => "panel_users_limited",
            Gauge::IncomingBandwidth => "all_incoming_bandwidth",
            Gauge::OutgoingBandwidth => "all_outgoing_bandwidth",
            Gauge::IncomingBandwidthSpeed => "panel_incoming_bandwidth_speed",
            Gauge::OutgoingBandwidthSpeed => "panel_outgoing_bandwidth_speed",
            Gauge::OnlineUsersCount => "online_users_count",
            Gauge::XrayVersion => "xray_version",
            Gauge::CollectorSuccess => "exporter_collector_success",
            Gauge::CollectorDuration => "exporter_collector_duration_seconds",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Gauge::NodesStatus => "Status of panel nodes (1 = connected)",
            Gauge::NodesUplink => "Uplink traffic of panel nodes",
            Gauge::NodesDownlink => "Downlink traffic of panel nodes",
            Gauge::UserDataLimit => "Data limit of the user",
            Gauge::UserUsedTraffic => "Used traffic of the user",
            Gauge::UserLifetimeUsedTraffic => "Lifetime used traffic of the user",
            Gauge::UserExpirationDate => "User's subscription expiration date",
            Gauge::UserOnline => "Whether a user was seen within the inactivity window",
            Gauge::CoreStarted => "Indicates if the panel core is started",
            Gauge::MemTotal => "Panel total memory",
            Gauge::MemUsed => "Panel used memory",
            Gauge::CpuCores => "Panel number of CPU cores",
            Gauge::CpuUsage => "Panel CPU usage",
            Gauge::TotalUsers => "Total number of users",
            Gauge::UsersActive => "Number of active users",
            Gauge::UsersOnline => "Number of online users reported by the panel",
            Gauge::UsersOnHold => "Number of on-hold users",
            Gauge::UsersDisabled => "Number of disabled users",
            Gauge::UsersExpired => "Number of expired users",
            Gauge::UsersLimited => "Number of limited users",
            Gauge::IncomingBandwidth => "Incoming bandwidth with all nodes",
            Gauge::OutgoingBandwidth => "Outgoing bandwidth with all nodes",
            Gauge::IncomingBandwidthSpeed => "Panel incoming bandwidth speed",
            Gauge::OutgoingBandwidthSpeed => "Panel outgoing bandwidth speed",
            Gauge::OnlineUsersCount => "Number of clients currently online",
            Gauge::XrayVersion => "Xray core version reported by the server status",
            Gauge::CollectorSuccess => "Whether the last run of a collector succeeded",
            Gauge::CollectorDuration => "Duration of the last run of a collector in seconds",
        }
    }

    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Gauge::NodesStatus => NODE_STATUS_LABELS,
            Gauge::NodesUplink | Gauge::NodesDownlink => NODE_USAGE_LABELS,
            Gauge::UserDataLimit
            | Gauge::UserUsedTraffic
            | Gauge::UserLifetimeUsedTraffic
            | Gauge::UserExpirationDate => USER_LABELS,
            Gauge::UserOnline => USER_ONLINE_LABELS,
            Gauge::CoreStarted | Gauge::XrayVersion => VERSION_LABELS,
            Gauge::CollectorSuccess | Gauge::CollectorDuration => COLLECTOR_LABELS,
            _ => NO_LABELS,
        }
    }
}
