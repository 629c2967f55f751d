//! HTTP front for the provider adapter and the problem catalog.
//!
//! Routes:
//! - `POST /api/chat`: OpenAI-style messages in, OpenAI-compatible envelope out.
//! - `GET /api/<resource>/problem/<slug>`: problem metadata lookup.
//! - `GET /health`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use leetcoach_core::problem::{ProblemCatalog, ProblemResponse};
use leetcoach_core::{ChatRequest, CoachError, ErrorBody, ProviderAdapter, Settings};

pub const MISSING_MESSAGES: &str = "Messages array is required";
pub const PROCESSING_FAILED: &str = "Error processing your request";

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ProviderAdapter>,
    pub catalog: Arc<dyn ProblemCatalog>,
    /// Path segment of the lookup route, e.g. `leetcode`.
    pub resource: String,
}

impl AppState {
    pub fn new(adapter: ProviderAdapter, catalog: Arc<dyn ProblemCatalog>) -> Self {
        Self {
            adapter: Arc::new(adapter),
            catalog,
            resource: "leetcode".to_string(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CoachError> {
        let adapter = ProviderAdapter::new(settings.build_llm_client()?);
        let catalog = settings.build_catalog()?;
        Ok(Self::new(adapter, catalog).with_resource(&settings.lookup.resource))
    }
}

pub fn router(state: AppState) -> Router {
    let problem_route = format!("/api/{}/problem/:slug", state.resource);

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route(&problem_route, get(problem))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(MISSING_MESSAGES))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) if !request.messages.is_empty() => request,
        Ok(_) => return bad_request(),
        Err(rejection) => {
            debug!(error = %rejection, "rejecting chat request");
            return bad_request();
        }
    };

    match state.adapter.complete(&request).await {
        Ok(completion) => Json(completion).into_response(),
        Err(CoachError::InvalidRequest(_)) => bad_request(),
        Err(e) => {
            error!(error = %e, "provider call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(PROCESSING_FAILED).with_details(e.to_string())),
            )
                .into_response()
        }
    }
}

async fn problem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Json<ProblemResponse> {
    let valid = !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Json(ProblemResponse::not_found());
    }

    match state.catalog.find(&slug).await {
        Ok(Some(problem)) => Json(ProblemResponse::found(problem)),
        Ok(None) => Json(ProblemResponse::not_found()),
        Err(e) => {
            warn!(slug = %slug, error = %e, "problem catalog failed");
            Json(ProblemResponse::not_found())
        }
    }
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings)?;
    let listener = TcpListener::bind(settings.bind_address()).await?;
    info!(
        addr = %listener.local_addr()?,
        provider = ?settings.provider.kind,
        model = %settings.provider.model,
        "server running"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
