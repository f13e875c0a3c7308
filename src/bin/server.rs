use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

use expense_auth::config::ServerConfig;
use expense_auth::core::AppState;
use expense_auth::handlers::routes;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("No .env file loaded: {}", e),
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, token_ttl={}s",
        config.host,
        config.port,
        config.auth.token_ttl.as_secs()
    );

    let state = Arc::new(AppState::in_memory(&config.auth));

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting expense auth server on {}", addr);

    warp::serve(routes(state)).run(addr).await;
}
