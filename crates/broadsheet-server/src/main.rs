use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use broadsheet_client::ApiClient;
use broadsheet_core::config::{Config, DEFAULT_BIND_PORT};
use broadsheet_server::state::AppState;

/// `seo-broadsheet health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:<port>/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = Config::from_env()
        .map(|cfg| cfg.bind_port())
        .unwrap_or(DEFAULT_BIND_PORT);
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("broadsheet_server=info".parse()?)
                .add_directive("broadsheet_core=info".parse()?)
                .add_directive("broadsheet_client=info".parse()?)
                .add_directive("broadsheet_report=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    std::fs::create_dir_all(&cfg.log_folder)?;
    std::fs::create_dir_all(&cfg.cache_root)?;

    let client = ApiClient::from_config(&cfg)?;
    let addr = cfg.bind_addr();
    info!(
        api_url = %cfg.api_url,
        hosting = ?cfg.hosting,
        cache_root = %cfg.cache_root.display(),
        public_url = %cfg.public_url("/"),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::new(cfg, Arc::new(client)));
    let app = broadsheet_server::app::build_app(state);

    info!("SEO broadsheet listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
