//! Axum route handlers for learning plans.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::plan::PlanBody;
use crate::planning::synthesizer::{synthesize_plan, PlanSource};
use crate::routes::run_detached;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub employee_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub plan: PlanBody,
    pub source: PlanSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

/// POST /api/v1/learning-plans
///
/// Returns the employee's assigned plan, regenerating it when their
/// assessment history changed since it was stored.
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let store = Arc::clone(&state.store);
    let llm = Arc::clone(&state.llm);

    let outcome = run_detached(async move {
        synthesize_plan(store.as_ref(), llm.as_ref(), request.employee_id).await
    })
    .await?;

    Ok(Json(PlanResponse {
        plan: outcome.plan,
        source: outcome.source,
        persistence_error: outcome.persistence_error,
    }))
}
