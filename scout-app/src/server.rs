use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use scout_common::ResultPayload;
use scout_config::EnvironmentConfig;
use scout_drivers::environment::{check_versions, EnvironmentError};
use scout_web::Pipeline;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub environment: Arc<EnvironmentConfig>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, environment: EnvironmentConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            environment: Arc::new(environment),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchRequest {
    #[serde(default)]
    emails: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Environment(EnvironmentError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Environment(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Chrome and ChromeDriver versions are incompatible",
                    "detail": err.to_string(),
                })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(err: JoinError) -> Self {
        warn!(target: "scout.server", error = %err, "server.task_failed");
        ApiError::Internal(err.to_string())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract-careers", post(extract_careers))
        .route("/extract-careers/batch", post(extract_careers_batch))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(target: "scout.server", addr = %listener.local_addr()?, "server.listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn extract_careers(
    State(state): State<AppState>,
    body: Option<Json<ExtractRequest>>,
) -> Result<Json<ResultPayload>, ApiError> {
    precondition(&state.environment).await?;

    let email = body
        .and_then(|Json(req)| req.email)
        .filter(|email| !email.trim().is_empty())
        .ok_or(ApiError::BadRequest("No email provided"))?;
    info!(target: "scout.server", %email, "server.extract");

    // Runs detached: the session is closed even if the client goes away.
    let pipeline = Arc::clone(&state.pipeline);
    let task = tokio::spawn({
        let email = email.clone();
        async move { pipeline.run(&email).await }
    });
    let payload = task.await?.map_err(|err| {
        info!(target: "scout.server", %email, error = %err, "server.invalid_email");
        ApiError::BadRequest("Invalid email format")
    })?;
    Ok(Json(payload))
}

async fn extract_careers_batch(
    State(state): State<AppState>,
    body: Option<Json<BatchRequest>>,
) -> Result<Json<Vec<ResultPayload>>, ApiError> {
    precondition(&state.environment).await?;

    let emails = body.map(|Json(req)| req.emails).unwrap_or_default();
    if emails.is_empty() {
        return Err(ApiError::BadRequest("No emails provided"));
    }
    info!(target: "scout.server", count = emails.len(), "server.batch");

    let pipeline = Arc::clone(&state.pipeline);
    let payloads = tokio::spawn(async move {
        let mut payloads = Vec::with_capacity(emails.len());
        for email in &emails {
            match pipeline.run(email).await {
                Ok(payload) => payloads.push(payload),
                Err(err) => {
                    info!(target: "scout.server", %email, error = %err, "server.batch.skipped");
                }
            }
        }
        payloads
    })
    .await?;
    Ok(Json(payloads))
}

async fn precondition(environment: &EnvironmentConfig) -> Result<(), ApiError> {
    if !environment.check_versions {
        return Ok(());
    }
    check_versions(environment)
        .await
        .map(|_| ())
        .map_err(|err| {
            warn!(target: "scout.server", error = %err, "server.environment_failed");
            ApiError::Environment(err)
        })
}
