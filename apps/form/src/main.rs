#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use penguin_form::{config, construct_router, state::State, telemetry};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    telemetry::init_telemetry();

    tracing::info!("Starting Penguin Species Prediction form");

    let config = config::Config::from_env()?;
    tracing::info!("Loaded configuration: artifacts={}", config.artifacts);
    for (artifact, path) in config.artifacts.paths() {
        tracing::debug!("Expecting artifact `{}` at {}", artifact, path.display());
    }

    let state = Arc::new(State::new(config.artifacts.clone()));
    if !state.is_ready() {
        tracing::warn!("Serving without artifacts; the page will only show the load error");
    }

    let app = construct_router(state);

    let addr = config.addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
