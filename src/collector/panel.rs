//! Collectors for the `/panel/api` routes, whose answers are wrapped in an
//! `{success, msg, obj}` envelope.
use serde::de::DeserializeOwned;

use super::error::DecodeError;
use super::models::{Envelope, OnlineClients, ServerStatus};
use crate::metrics::{Gauge, MetricSink};

fn open<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, DecodeError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    if !envelope.success {
        return Err(DecodeError::Unsuccessful(envelope.msg));
    }
    Ok(envelope.obj)
}

/// Sets the number of online clients; a `null` list means nobody is online.
pub(super) fn record_online_count(
    body: &[u8],
    sink: &dyn MetricSink,
) -> Result<usize, DecodeError> {
    let online = open::<OnlineClients>(body)?.map_or(0, |clients| clients.len());
    sink.set_gauge(Gauge::OnlineUsersCount, &[], online as f64);
    Ok(1)
}

pub(super) fn record_server_status(
    body: &[u8],
    sink: &dyn MetricSink,
) -> Result<usize, DecodeError> {
    let status = open::<ServerStatus>(body)?.ok_or(DecodeError::MissingPayload)?;
    if let Some(state) = &status.xray.state {
        log::trace!("Xray state: {state}");
    }
    let version = status.xray.version.as_deref().unwrap_or("");
    sink.set_gauge(Gauge::XrayVersion, &[version], 1.0);
    Ok(1)
}
