use std::sync::Arc;

use client::PanelClient;
use collector::{ActivityWindow, Collector};
use config::Config;
use metrics::{MetricSink, PrometheusSink};
use scheduler::Scheduler;
use session::{LoginSettings, PanelAuthenticator, SessionCache};

/// Panel Exporter: polls a proxy management panel's HTTP API and exposes
/// what it finds as Prometheus gauges.
///
/// The library logs in once per credential lifetime, runs one collector per
/// resource family on a fixed interval and serves the resulting gauges at
/// `/metrics`.
pub mod api;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod session;

/// Runs the exporter until the metrics endpoint stops.
///
/// # Errors
///
/// Possible errors include:
/// - An invalid configuration (e.g., an unknown timezone).
/// - Failure to register the gauges.
/// - Failure to bind the metrics port.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = config.endpoint()?;
    log::debug!("Panel endpoint: {:?}", endpoint);
    let client = PanelClient::new(endpoint, config.request_timeout());

    let authenticator = PanelAuthenticator::new(
        client.clone(),
        LoginSettings {
            scheme: config.auth_scheme,
            path: config.login_path().to_owned(),
            encoding: config.login_encoding,
            username: config.panel_username.clone(),
            password: config.panel_password.clone(),
            cookie_name: config.session_cookie.clone(),
            ttl: config.credential_ttl(),
        },
    );
    let session = Arc::new(SessionCache::new(authenticator));

    let sink = Arc::new(PrometheusSink::new(&config.metrics_namespace)?);
    let activity = ActivityWindow::new(config.inactivity_window(), config.time_zone()?);
    let collector = Arc::new(Collector::new(
        client,
        Arc::clone(&sink) as Arc<dyn MetricSink>,
        activity,
        config.users_page_size,
    ));

    let scheduler = Scheduler::new(session, collector, config.update_interval());
    let _tickers = scheduler.start(&config.collectors);
    log::info!(
        "Started {} collectors: {:?}",
        config.collectors.len(),
        config.collectors
    );

    let auth = config.metrics_protected.then(|| api::BasicAuth {
        username: config.metrics_username.clone(),
        password: config.metrics_password.clone(),
    });
    api::APIServer::new(sink, auth)
        .listen(("0.0.0.0", config.metrics_port))
        .await?;
    Ok(())
}
