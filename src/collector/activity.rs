use std::time::Duration;

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, Zoned};

/// Decides whether a user counts as online from their last-seen timestamp.
#[derive(Debug, Clone)]
pub struct ActivityWindow {
    window: SignedDuration,
    time_zone: TimeZone,
}

impl ActivityWindow {
    pub fn new(window: Duration, time_zone: TimeZone) -> Self {
        Self {
            window: SignedDuration::try_from(window).unwrap_or(SignedDuration::MAX),
            time_zone,
        }
    }

    /// `true` iff `last_seen` lies at most the window before `now`.
    ///
    /// The panel reports timestamps without an offset in UTC. Both sides are
    /// projected into the configured zone before comparing. Missing or
    /// unparsable timestamps count as offline.
    pub fn is_online(&self, now: Timestamp, last_seen: Option<&str>) -> bool {
        let Some(raw) = last_seen.map(str::trim) else {
            return false;
        };
        let Some(seen) = self.project(raw) else {
            log::debug!("Unparsable last seen timestamp `{raw}`");
            return false;
        };
        let now = now.to_zoned(self.time_zone.clone());
        now.duration_since(&seen) <= self.window
    }

    fn project(&self, raw: &str) -> Option<Zoned> {
        if let Ok(instant) = raw.parse::<Timestamp>() {
            return Some(instant.to_zoned(self.time_zone.clone()));
        }
        let utc = raw.parse::<DateTime>().ok()?.to_zoned(TimeZone::UTC).ok()?;
        Some(utc.with_time_zone(self.time_zone.clone()))
    }
}

/// First token of a user agent, e.g. `v2rayNG` for `v2rayNG/1.8.5`.
pub fn user_agent_family(raw: Option<&str>) -> &str {
    raw.and_then(|agent| {
        agent
            .split(['/', ' ', ';', '('])
            .map(str::trim)
            .find(|token| !token.is_empty())
    })
    .unwrap_or("unknown")
}
