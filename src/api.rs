//! HTTP API endpoints.
//!
//! Every handler reads the whole document, applies one change, and returns
//! the whole resulting document. Clients are expected to re-fetch or use the
//! returned document; there is no push channel.
//!
//! Session identity is whatever the client claims in `X-Session-Id`. The
//! activator check on mutation endpoints is therefore advisory, and
//! `PUT /api/state` skips it entirely.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::*;

/// Header carrying the client's session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Routes under /api plus the health check
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/state", get(get_state).put(put_state))
        .route("/api/activate", post(activate))
        .route("/api/restaurants", post(add_restaurant))
        .route("/api/restaurants/bulk-delete", post(bulk_delete))
        .route("/api/restaurants/{id}", delete(remove_restaurant))
        .route("/api/restaurants/{id}/blacklist", post(toggle_blacklist))
        .route("/api/restaurants/{id}/reset-cooldown", post(reset_cooldown))
        .route("/api/cooldown", put(set_cooldown))
        .route("/api/pick", post(pick))
}

/// Extract the claimed session id from request headers
fn session_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("Missing {} header", SESSION_HEADER)))
}

/// Unwrap a JSON body, mapping axum's rejection onto our validation error
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /api/state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<ServerState> {
    Json(state.get_document().await)
}

/// PUT /api/state
///
/// Merges whichever of `restaurants`, `cooldownWeeks` and `activatedBy` are
/// present and valid; everything else is kept.
pub async fn put_state(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ServerState>, AppError> {
    let patch = body(payload)?;
    Ok(Json(state.put_document(&patch).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateResponse {
    pub activated: bool,
    pub state: ServerState,
}

/// POST /api/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> Result<Json<ActivateResponse>, AppError> {
    let session = session_id(&headers)?;
    let request = body(payload)?;
    let doc = state.activate(&request.secret, &session).await?;
    Ok(Json(ActivateResponse {
        activated: true,
        state: doc,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRestaurantRequest {
    pub name: String,
}

/// POST /api/restaurants
pub async fn add_restaurant(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AddRestaurantRequest>, JsonRejection>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    let request = body(payload)?;
    Ok(Json(state.add_restaurant(&session, &request.name).await?))
}

/// DELETE /api/restaurants/{id}
pub async fn remove_restaurant(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<RestaurantId>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    Ok(Json(state.remove_restaurant(&session, &id).await?))
}

/// POST /api/restaurants/{id}/blacklist
pub async fn toggle_blacklist(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<RestaurantId>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    Ok(Json(state.toggle_blacklist(&session, &id).await?))
}

/// POST /api/restaurants/{id}/reset-cooldown
pub async fn reset_cooldown(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<RestaurantId>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    Ok(Json(state.reset_cooldown(&session, &id).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<RestaurantId>,
}

/// POST /api/restaurants/bulk-delete
pub async fn bulk_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    let request = body(payload)?;
    Ok(Json(state.bulk_delete(&session, &request.ids).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownRequest {
    pub cooldown_weeks: f64,
}

/// PUT /api/cooldown
pub async fn set_cooldown(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CooldownRequest>, JsonRejection>,
) -> Result<Json<ServerState>, AppError> {
    let session = session_id(&headers)?;
    let request = body(payload)?;
    Ok(Json(
        state
            .set_cooldown_weeks(&session, request.cooldown_weeks)
            .await?,
    ))
}

/// POST /api/pick
pub async fn pick(State(state): State<Arc<AppState>>) -> Result<Json<PickOutcome>, AppError> {
    Ok(Json(state.pick_restaurant().await?))
}
