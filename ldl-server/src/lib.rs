//! Long Distance Love backend.
//!
//! A thin HTTP service that relays chat messages to the OpenAI completion
//! API, keeps a bounded in-memory conversation history per user, and can
//! ground replies in the text of an uploaded PDF.
//!
//! ## Architecture
//!
//! ```text
//! Client → /upload → PDF extractor → session store (document slot)
//! Client → /chat   → session store (history) → generator → OpenAI → client
//! ```

#![warn(clippy::all)]

pub mod extract;
pub mod generate;
pub mod provider;
pub mod routes;
pub mod session;

pub use generate::{ResponseGenerator, DEFAULT_MODEL, PERSONA};
pub use provider::{ChatRequest, ChatResponse, OpenAIProvider, Provider, ProviderError};
pub use session::{Message, Role, SessionStore, UserSession, DEFAULT_USER_ID, MAX_HISTORY};

use axum::Router;
use routes::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use ldl_common::Config;

/// Build the application router against the configured OpenAI endpoint.
pub fn build_router(config: &Config) -> Router {
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; completion calls will fail");
    }
    let api_key = config.llm.api_key.clone().unwrap_or_default();

    let provider: Arc<dyn Provider> = match &config.llm.base_url {
        Some(url) => Arc::new(OpenAIProvider::with_base_url(api_key, url)),
        None => Arc::new(OpenAIProvider::new(api_key)),
    };

    build_router_with_provider(provider)
}

/// Build the application router with an explicit provider.
/// This is useful for testing with a mock upstream.
pub fn build_router_with_provider(provider: Arc<dyn Provider>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        sessions: Arc::new(SessionStore::new()),
        generator: Arc::new(ResponseGenerator::new(provider)),
    };

    routes::build_routes(state).layer(cors)
}

/// Start the HTTP server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let router = build_router(config);

    tracing::info!("Starting ldl-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
