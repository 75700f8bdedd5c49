use panel_exporter::config::Config;

/// Entry point for the panel exporter.
///
/// Parses the configuration from flags and environment variables, then polls
/// the panel and serves the collected gauges until terminated.
///
/// # Examples
///
/// ```bash
/// PANEL_BASE_URL=http://127.0.0.1:8000 PANEL_USERNAME=admin PANEL_PASSWORD=secret \
///     RUST_LOG=info cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    panel_exporter::run(config).await
}
