//! Upstream response shapes.
//!
//! Nullable or version-dependent fields are `Option`s so one missing value
//! never rejects the whole entity.
use serde::Deserialize;
use serde::de::IgnoredAny;

#[derive(Debug, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub usage_coefficient: Option<f64>,
    #[serde(default)]
    pub xray_version: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NodeUsage {
    #[serde(default)]
    pub node_id: Option<u64>,
    pub node_name: String,
    #[serde(default)]
    pub uplink: f64,
    #[serde(default)]
    pub downlink: f64,
}

#[derive(Debug, Deserialize)]
pub struct UsagesPage {
    pub usages: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SystemStats {
    pub mem_total: Option<f64>,
    pub mem_used: Option<f64>,
    pub cpu_cores: Option<f64>,
    pub cpu_usage: Option<f64>,
    pub total_user: Option<f64>,
    pub users_active: Option<f64>,
    pub online_users: Option<f64>,
    pub users_on_hold: Option<f64>,
    pub users_disabled: Option<f64>,
    pub users_expired: Option<f64>,
    pub users_limited: Option<f64>,
    pub incoming_bandwidth: Option<f64>,
    pub outgoing_bandwidth: Option<f64>,
    pub incoming_bandwidth_speed: Option<f64>,
    pub outgoing_bandwidth_speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CoreStatus {
    #[serde(default)]
    pub version: Option<String>,
    pub started: bool,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub used_traffic: Option<f64>,
    #[serde(default)]
    pub lifetime_used_traffic: Option<f64>,
    #[serde(default)]
    pub data_limit: Option<f64>,
    #[serde(default)]
    pub data_limit_reset_strategy: Option<String>,
    /// Expiration as a UNIX timestamp.
    #[serde(default)]
    pub expire: Option<f64>,
    /// Last time the user was seen, `YYYY-MM-DDTHH:MM:SS` in UTC without offset.
    #[serde(default)]
    pub online_at: Option<String>,
    #[serde(default)]
    pub sub_last_user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsersPage {
    pub users: Vec<serde_json::Value>,
}

/// `{success, msg, obj}` wrapper used by the panel's `/panel/api` routes.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Option::default")]
    pub obj: Option<T>,
}

/// Payload of the online clients route; only its length matters.
pub type OnlineClients = Vec<IgnoredAny>;

#[derive(Debug, Deserialize)]
pub struct ServerStatus {
    pub xray: XrayStatus,
}

#[derive(Debug, Deserialize)]
pub struct XrayStatus {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}
