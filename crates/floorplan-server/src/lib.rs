//! Floor plan persistence API.
//!
//! JSON over HTTP:
//!
//! ```text
//! POST  /floor-plans                   create, 201 with the stored plan
//! PATCH /floor-plans/{id}              partial update, 404 if unknown
//! GET   /floor-plans/{id}              fetch one plan
//! GET   /floor-plans?business_id=...   list the plans of a business
//! GET   /health                        "ok"
//! ```
//!
//! Errors are returned as `{ "error": "<message>" }`.

pub mod config;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use dashmap::DashMap;
use floorplan_core::repository::{
    FloorPlan, FloorPlanCreate, FloorPlanUpdate, RepositoryError, sort_plans,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Shared application state
#[derive(Default)]
pub struct AppState {
    /// Stored plans by id
    plans: DashMap<String, FloorPlan>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored plans
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/floor-plans", get(list_plans).post(create_plan))
        .route("/floor-plans/{id}", get(get_plan).patch(update_plan))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error returned by the handlers, rendered as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(_) => ApiError::NotFound(e.to_string()),
            RepositoryError::Invalid(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(message) | ApiError::BadRequest(message) | ApiError::Internal(message) => message,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    business_id: String,
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FloorPlanCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<FloorPlan>), ApiError> {
    let Json(request) = payload?;
    let plan = FloorPlan::from_create(Uuid::new_v4().to_string(), request, Utc::now())?;
    state.plans.insert(plan.id.clone(), plan.clone());
    info!("Created floor plan {} for business {}", plan.id, plan.business_id);
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<FloorPlanUpdate>, JsonRejection>,
) -> Result<Json<FloorPlan>, ApiError> {
    let Json(changes) = payload?;
    let mut plan = state
        .plans
        .get_mut(&id)
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound(id.clone())))?;
    plan.apply_update(changes, Utc::now())?;
    info!("Updated floor plan {}", id);
    Ok(Json(plan.value().clone()))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FloorPlan>, ApiError> {
    state
        .plans
        .get(&id)
        .map(|plan| Json(plan.value().clone()))
        .ok_or_else(|| RepositoryError::NotFound(id).into())
}

async fn list_plans(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<FloorPlan>>, ApiError> {
    let Query(query) = query?;
    let mut plans: Vec<FloorPlan> = state
        .plans
        .iter()
        .filter(|entry| entry.business_id == query.business_id)
        .map(|entry| entry.value().clone())
        .collect();
    sort_plans(&mut plans);
    Ok(Json(plans))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_status() {
        let cases = [
            (RepositoryError::NotFound("p1".to_string()), StatusCode::NOT_FOUND),
            (RepositoryError::Invalid("name must not be empty".to_string()), StatusCode::BAD_REQUEST),
            (RepositoryError::Io("disk full".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }
}
