mod auth;
mod config;
mod db;
mod llm;
mod review;
mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AuthMode;
use crate::llm::{GeminiClient, LlmClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terakoya=info,tower_http=info".into()),
        )
        .init();

    let config = Arc::new(config::Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(pool.as_ref()).await?;

    let llm: Option<Arc<dyn LlmClient>> = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiClient::new(key.clone(), config.max_code_length);
            Some(Arc::new(client) as Arc<dyn LlmClient>)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; review requests will be rejected with 503");
            None
        }
    };

    if config.auth_mode == AuthMode::SeededBypass {
        tracing::warn!("auth bypass enabled; all requests resolve to the seeded user");
    }

    let state = Arc::new(state::AppState {
        store: db::PgStore::new(pool.clone()),
        pool,
        config: config.clone(),
        llm,
    });

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/reviews", post(routes::reviews::request_review))
        .route("/api/reviews/:submission_id", get(routes::reviews::get_review))
        .route(
            "/api/submissions",
            post(routes::submissions::create).get(routes::submissions::list_mine),
        )
        .route("/api/submissions/all", get(routes::submissions::list_all))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Terakoya listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
