pub mod handlers;
pub mod types;

pub use handlers::AppState;

use crate::{
    Result,
    config::{Config, LlmConfig, ServerConfig},
    llm::{GenerativeModel, OpenAiModel},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/calculate", post(handlers::calculate))
        .route("/search", post(handlers::search))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds handler state from config. A missing API key leaves the model
/// unset so the endpoints can report it instead of the server failing.
pub fn build_state(llm: &LlmConfig) -> Result<AppState> {
    let model: Option<Arc<dyn GenerativeModel>> = if llm.is_configured() {
        info!(
            "Using {} model {} at {}",
            llm.provider, llm.model, llm.base_url
        );
        Some(Arc::new(OpenAiModel::new(llm.clone())?))
    } else {
        warn!("No API key configured; /calculate and /search will report the model as unavailable");
        None
    };

    let mut state = AppState::new(model);
    if let Some(prompt) = &llm.system_prompt {
        state = state.with_system_prompt(prompt.as_str());
    }

    Ok(state)
}

pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config.llm)?;
    let app = router(state, &config.server);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
