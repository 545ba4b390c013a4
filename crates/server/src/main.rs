use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, routing::get, Json, Router};
use shared::protocol::{GreetingResponse, HEALTHZ_PATH, HELLO_PATH};
use tracing::info;

mod config;

use config::load_settings;

struct AppState {
    greeting: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let state = AppState {
        greeting: settings.greeting,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTHZ_PATH, get(healthz))
        .route(HELLO_PATH, get(hello))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn hello(State(state): State<Arc<AppState>>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: Some(state.greeting.clone()),
    })
}
