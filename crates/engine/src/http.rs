//! HTTP transport: axum routes over the service facade (§6).
//!
//! Grounded on the teacher's world route handlers - `State<Arc<AppState>>`
//! extraction, path-parameter parsing, and `Result<Json<T>, (StatusCode,
//! String)>` handler returns.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use scenesmith_domain::{DomainError, RenderContext, SceneId};
use scenesmith_shared::dto::{ErrorResponse, RenderResponse, StatusResponse};

use crate::app::AppState;
use crate::provider_pool::ProviderSnapshot;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scene/render", post(render_scene))
        .route("/api/scene/status/{scene_id}", get(get_scene_status))
        .route("/api/scene/rerender/{scene_id}", post(rerender_scene))
        .route("/health", get(health_check))
        .route("/api/provider", get(provider_info))
        .with_state(state)
}

async fn render_scene(
    State(state): State<Arc<AppState>>,
    Json(ctx): Json<RenderContext>,
) -> Result<Json<RenderResponse>, (StatusCode, Json<ErrorResponse>)> {
    let descriptor = state.service.render(ctx).await.map_err(to_response)?;
    Ok(Json(RenderResponse::from_descriptor(&descriptor)))
}

async fn get_scene_status(
    State(state): State<Arc<AppState>>,
    Path(scene_id): Path<String>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let descriptor = state.service.get_status(scene_id).await.map_err(to_response)?;
    Ok(Json(StatusResponse::from_descriptor(&descriptor, Utc::now())))
}

async fn rerender_scene(
    State(state): State<Arc<AppState>>,
    Path(scene_id): Path<String>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let scene_id = parse_scene_id(&scene_id)?;
    let descriptor = state.service.rerender(scene_id).await.map_err(to_response)?;
    Ok(Json(StatusResponse::from_descriptor(&descriptor, Utc::now())))
}

/// Response body for `/health` and `/api/provider`, grounded on the
/// original `get_provider_snapshot()`: the primary provider is just the
/// pool's first entry, reported alongside the full per-entry breakdown.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderPoolResponse {
    provider: Option<String>,
    model: Option<String>,
    provider_pool: Vec<ProviderSnapshot>,
}

impl ProviderPoolResponse {
    fn from_pool(pool: &crate::provider_pool::ProviderPool) -> Self {
        let snapshot = pool.snapshot();
        let primary = snapshot.first();
        Self {
            provider: primary.map(|p| p.id.clone()),
            model: primary.map(|p| p.model.clone()),
            provider_pool: snapshot,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    providers: ProviderPoolResponse,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        providers: ProviderPoolResponse::from_pool(&state.provider_pool),
    })
}

async fn provider_info(State(state): State<Arc<AppState>>) -> Json<ProviderPoolResponse> {
    Json(ProviderPoolResponse::from_pool(&state.provider_pool))
}

fn parse_scene_id(raw: &str) -> Result<SceneId, (StatusCode, Json<ErrorResponse>)> {
    raw.parse().map_err(|_| {
        to_response(DomainError::invalid_input(format!(
            "'{raw}' is not a valid scene id"
        )))
    })
}

/// Map the orchestrator's error taxonomy onto HTTP status codes (§7):
/// invalid input and not-found are client errors, service-unavailable
/// is a 5xx. `RenderFailure` never reaches here - it only ever shows up
/// as a scene status.
fn to_response(err: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let error_kind = match &err {
        DomainError::InvalidInput(_) => "invalid_input",
        DomainError::NotFound(_) => "not_found",
        DomainError::ServiceUnavailable(_) => "service_unavailable",
    };
    (
        status,
        Json(ErrorResponse {
            error: error_kind.to_string(),
            message: err.to_string(),
        }),
    )
}
