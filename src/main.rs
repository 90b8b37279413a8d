mod archive;
mod config;
mod content;
mod error;
mod models;
mod ollama;
mod parse;
mod prompt;
mod ratelimit;
mod routes;
mod theme;
mod vision;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::ollama::OllamaClient;
use crate::ratelimit::RateLimiter;
use crate::routes::AppState;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Arc::new(Config::from_env());
    tracing::info!(
        host = %config.ollama_host,
        code_model = %config.code_model,
        vision_model = %config.vision_model,
        "Loaded configuration"
    );

    let state = AppState {
        ollama: Arc::new(OllamaClient::new(&config)),
        limiter: Arc::new(RateLimiter::new(config.rate_limit_per_minute)),
        config: config.clone(),
    };

    // Room for all image attachments plus the text fields.
    let body_limit = config.max_images * config.max_image_size_bytes() + 1024 * 1024;

    let app = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health_check))
        .route("/generate", post(routes::generate_website))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    axum::serve(
        tokio::net::TcpListener::bind(addr).await.unwrap(),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
