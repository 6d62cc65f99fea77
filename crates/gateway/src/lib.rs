//! HTTP gateway for Briar.
//!
//! Thin plumbing around the assistant core: request validation and identity
//! extraction happen here, everything else is delegated. Authentication is
//! upstream's concern; the gateway trusts the `x-user-id` header.
//!
//! Built on Axum with CORS and trace layers from tower-http.

pub mod api;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use briar_assistant::{Assistant, AssistantOptions};
use briar_config::AppConfig;
use briar_core::{Error, ModelError, ModelProvider, ProfileError, ProfileRepository};
use briar_knowledge::{KeywordSelector, KnowledgeStore};
use briar_profiles::{InMemoryProfiles, SqliteProfiles};
use briar_providers::OpenAiClient;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub assistant: Assistant,
    pub store: Arc<KnowledgeStore>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub max_events: usize,
}

pub type SharedState = Arc<AppState>;

/// Build the full router with CORS and trace layers.
pub fn build_router(state: SharedState) -> axum::Router {
    api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Wire up every component from configuration and serve until shutdown.
pub async fn serve(config: AppConfig) -> Result<(), Error> {
    let api_key = config.api_key.clone().ok_or_else(|| Error::Config {
        message: "no API key configured; set BRIAR_API_KEY or api_key in briar.toml".into(),
    })?;

    let provider: Arc<dyn ModelProvider> =
        Arc::new(OpenAiClient::from_config(&config.model, api_key));

    let profiles: Arc<dyn ProfileRepository> = match config.profiles.backend.as_str() {
        "memory" => Arc::new(InMemoryProfiles::new(config.chat.max_history)),
        _ => Arc::new(
            SqliteProfiles::new(
                &config.profiles.db_path.to_string_lossy(),
                config.chat.max_history,
            )
            .await?,
        ),
    };

    let store = Arc::new(KnowledgeStore::new(
        config.knowledge.data_dir.clone(),
        config.knowledge.cache_ttl_secs,
    ));

    let assistant = Assistant::new(
        Arc::clone(&store),
        Box::new(KeywordSelector::new(config.knowledge.max_events)),
        provider,
        Arc::clone(&profiles),
        AssistantOptions::from_config(&config),
    );

    let state = Arc::new(AppState {
        assistant,
        store,
        profiles,
        max_events: config.knowledge.max_events,
    });

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(state);

    info!(addr = %addr, "gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("failed to bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("server error: {e}")))?;

    Ok(())
}

// ── Error mapping ─────────────────────────────────────────────────────────

/// Wraps the domain error for conversion into an HTTP response.
///
/// Internal detail (file paths, backend messages) never reaches the client;
/// it is logged server-side instead.
pub struct ApiError(pub Error);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Model(ModelError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "The assistant is busy right now, try again in a moment".into(),
            ),
            Error::Model(ModelError::AuthenticationFailed(_))
            | Error::Model(ModelError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The assistant is temporarily unavailable".into(),
            ),
            Error::Profile(ProfileError::NotFound(_))
            | Error::Profile(ProfileError::TodoNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Not found".into())
            }
            Error::Knowledge(e) => {
                tracing::error!(error = %e, "knowledge base failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "School information is temporarily unavailable".into(),
                )
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".into(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl<E: Into<Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}
