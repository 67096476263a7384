mod auth;
mod config;
mod credentials;
mod dto;
mod errors;
mod handlers;
mod models;
mod password;
mod routes;
mod services;
mod state;
mod store;

use crate::{config::Config, routes::app_router, state::AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_tokens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env().expect("invalid configuration");
    // missing or unreadable key material is fatal here, never a per-request error
    let state = Arc::new(AppState::new(&cfg).await.expect("init state"));

    let app = app_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cfg.bind_addr).await.expect("bind");
    tracing::info!(addr = %cfg.bind_addr, "listening");

    axum::serve(listener, app).await.expect("server");
}
