//! Command line and environment configuration.
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use jiff::tz::TimeZone;

use crate::client::Endpoint;
use crate::collector::CollectionTarget;
use crate::session::{AuthScheme, LoginEncoding};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("either --panel-base-url or --panel-socket must be provided")]
    MissingEndpoint,
    #[error("unsupported panel base URL `{0}`: expected an http:// or https:// URL")]
    UnsupportedScheme(String),
    #[error("unknown timezone `{name}`: {source}")]
    UnknownTimeZone {
        name: String,
        #[source]
        source: jiff::Error,
    },
    #[error("--{0} must be greater than zero")]
    Zero(&'static str),
    #[error("--{0} is too large")]
    TooLarge(&'static str),
    #[error("--collectors must name at least one collector")]
    NoCollectors,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Exporter configuration; every flag can also be set through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "panel-exporter",
    version,
    about = "Exports panel metrics in the Prometheus format"
)]
pub struct Config {
    /// Port the metrics endpoint listens on.
    #[arg(long, env = "METRICS_PORT", default_value_t = 9090)]
    pub metrics_port: u16,

    /// Protect the metrics endpoint with basic auth.
    #[arg(long, env = "METRICS_PROTECTED")]
    pub metrics_protected: bool,

    #[arg(long, env = "METRICS_USERNAME", default_value = "metricsUser")]
    pub metrics_username: String,

    #[arg(long, env = "METRICS_PASSWORD", default_value = "MetricsVeryHardPassword")]
    pub metrics_password: String,

    /// Prefix of every exported metric name.
    #[arg(long, env = "METRICS_NAMESPACE", default_value = "marzban")]
    pub metrics_namespace: String,

    /// Seconds between two runs of the same collector.
    #[arg(long, env = "UPDATE_INTERVAL", default_value_t = 60)]
    pub update_interval: u64,

    /// IANA timezone the panel reports last-seen timestamps in.
    #[arg(long, env = "TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    /// Minutes since last seen for which a user still counts as online.
    #[arg(long, env = "INACTIVITY_TIME", default_value_t = 2)]
    pub inactivity_time: u64,

    #[arg(long, env = "PANEL_BASE_URL")]
    pub panel_base_url: Option<String>,

    /// Unix socket of the panel; takes precedence over the base URL.
    #[arg(long, env = "PANEL_SOCKET")]
    pub panel_socket: Option<PathBuf>,

    #[arg(long, env = "PANEL_USERNAME")]
    pub panel_username: String,

    #[arg(long, env = "PANEL_PASSWORD")]
    pub panel_password: String,

    #[arg(long, env = "AUTH_SCHEME", value_enum, default_value_t = AuthScheme::Bearer)]
    pub auth_scheme: AuthScheme,

    /// Login path, defaults to the scheme's usual endpoint.
    #[arg(long, env = "LOGIN_PATH")]
    pub login_path: Option<String>,

    #[arg(long, env = "LOGIN_ENCODING", value_enum, default_value_t = LoginEncoding::Form)]
    pub login_encoding: LoginEncoding,

    /// Name of the session cookie when using the cookie scheme.
    #[arg(long, env = "SESSION_COOKIE", default_value = "3x-ui")]
    pub session_cookie: String,

    /// Upper bound in seconds for reusing a credential.
    #[arg(long, env = "CREDENTIAL_TTL", default_value_t = 43200)]
    pub credential_ttl: u64,

    /// Timeout in seconds of a single upstream request.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    #[arg(long, env = "USERS_PAGE_SIZE", default_value_t = 250)]
    pub users_page_size: usize,

    #[arg(
        long,
        env = "COLLECTORS",
        value_enum,
        value_delimiter = ',',
        default_values_t = CollectionTarget::ALL
    )]
    pub collectors: Vec<CollectionTarget>,
}

impl Config {
    /// Parses the process arguments and validates them.
    pub fn load() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        self.time_zone()?;
        for (flag, value) in [
            ("update-interval", self.update_interval),
            ("inactivity-time", self.inactivity_time),
            ("credential-ttl", self.credential_ttl),
            ("request-timeout", self.request_timeout),
            ("users-page-size", self.users_page_size as u64),
        ] {
            if value == 0 {
                return Err(Error::Zero(flag));
            }
        }
        if self.inactivity_time.checked_mul(60).is_none() {
            return Err(Error::TooLarge("inactivity-time"));
        }
        if self.collectors.is_empty() {
            return Err(Error::NoCollectors);
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        if let Some(path) = &self.panel_socket {
            return Ok(Endpoint::Unix { path: path.clone() });
        }
        match self.panel_base_url.as_deref().map(str::trim) {
            None | Some("") => Err(Error::MissingEndpoint),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                Err(Error::UnsupportedScheme(url.to_owned()))
            }
            Some(url) => Ok(Endpoint::Tcp {
                base_url: url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    pub fn time_zone(&self) -> Result<TimeZone> {
        TimeZone::get(&self.timezone).map_err(|source| Error::UnknownTimeZone {
            name: self.timezone.clone(),
            source,
        })
    }

    pub fn login_path(&self) -> &str {
        self.login_path
            .as_deref()
            .unwrap_or_else(|| self.auth_scheme.default_login_path())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn inactivity_window(&self) -> Duration {
        Duration::from_secs(self.inactivity_time.saturating_mul(60))
    }

    pub fn credential_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_ttl)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
