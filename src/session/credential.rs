use std::fmt;
use std::time::Duration;

use hyper::header::{self, HeaderName};
use jiff::{SignedDuration, Timestamp};

/// Subtracted from any expiry stated by the panel.
pub const EXPIRY_SAFETY_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// The proof of authentication accepted by the panel.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    Bearer(String),
    Cookie { name: String, value: String },
}

impl Secret {
    /// Header carrying this secret on a resource request.
    pub fn header(&self) -> (HeaderName, String) {
        match self {
            Secret::Bearer(token) => (header::AUTHORIZATION, format!("Bearer {token}")),
            Secret::Cookie { name, value } => (header::COOKIE, format!("{name}={value}")),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Secret::Cookie { name, .. } => write!(f, "Cookie({name}=<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    secret: Secret,
    expires_at: Timestamp,
}

impl Credential {
    pub fn new(secret: Secret, expires_at: Timestamp) -> Self {
        Self { secret, expires_at }
    }

    /// Creates a credential expiring at the earlier of `issued_at + ttl` and
    /// `stated_expiry - EXPIRY_SAFETY_MARGIN`.
    pub fn issue(
        secret: Secret,
        issued_at: Timestamp,
        ttl: Duration,
        stated_expiry: Option<Timestamp>,
    ) -> Self {
        let ttl = SignedDuration::try_from(ttl).unwrap_or(SignedDuration::MAX);
        let mut expires_at = issued_at.checked_add(ttl).unwrap_or(Timestamp::MAX);
        if let Some(stated) = stated_expiry {
            let stated = stated
                .checked_sub(EXPIRY_SAFETY_MARGIN)
                .unwrap_or(Timestamp::MIN);
            expires_at = expires_at.min(stated);
        }
        Self::new(secret, expires_at)
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn is_fresh_at(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// Extracts cookie `name` from a `Set-Cookie` header value.
///
/// Returns the cookie value and its expiry (`Max-Age` wins over `Expires`).
/// Deletion cookies (empty value or non-positive `Max-Age`) yield `None`.
pub fn parse_set_cookie(
    header: &str,
    name: &str,
    now: Timestamp,
) -> Option<(String, Option<Timestamp>)> {
    let mut parts = header.split(';');
    let (cookie_name, value) = parts.next()?.split_once('=')?;
    if cookie_name.trim() != name {
        return None;
    }
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        return None;
    }

    let mut max_age = None;
    let mut expires = None;
    for attr in parts {
        let Some((key, attr_value)) = attr.split_once('=') else {
            continue;
        };
        let attr_value = attr_value.trim();
        if key.trim().eq_ignore_ascii_case("max-age") {
            max_age = attr_value.parse::<i64>().ok();
        } else if key.trim().eq_ignore_ascii_case("expires") {
            expires = jiff::fmt::rfc2822::parse(attr_value)
                .ok()
                .map(|zoned| zoned.timestamp());
        }
    }

    let expiry = match max_age {
        Some(secs) if secs <= 0 => return None,
        Some(secs) => Some(
            now.checked_add(SignedDuration::from_secs(secs))
                .unwrap_or(Timestamp::MAX),
        ),
        None => expires,
    };
    if expiry.is_some_and(|at| at <= now) {
        return None;
    }

    Some((value.to_owned(), expiry))
}
