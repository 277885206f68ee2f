//! Axum route handlers for the quiz API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::cache::{
    get_or_create_baseline_quiz, get_or_create_module_quiz, QuizOutcome, QuizSource,
};
use crate::errors::AppError;
use crate::models::assessment::QuizVariant;
use crate::models::question::Question;
use crate::routes::run_detached;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleQuizRequest {
    pub module_id: Uuid,
    #[serde(default)]
    pub variant: QuizVariant,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineQuizRequest {
    pub company_id: Uuid,
    #[serde(default)]
    pub module_ids: Vec<Uuid>,
    pub training_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub quiz: Vec<Question>,
    pub assessment_id: Uuid,
    pub source: QuizSource,
}

impl From<QuizOutcome> for QuizResponse {
    fn from(outcome: QuizOutcome) -> Self {
        Self {
            quiz: outcome.questions,
            assessment_id: outcome.assessment_id,
            source: outcome.source,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/quizzes/module
///
/// Returns the stored quiz for the module and variant, generating it on first request.
pub async fn handle_module_quiz(
    State(state): State<AppState>,
    Json(request): Json<ModuleQuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let store = Arc::clone(&state.store);
    let llm = Arc::clone(&state.llm);

    let outcome = run_detached(async move {
        get_or_create_module_quiz(
            store.as_ref(),
            llm.as_ref(),
            request.module_id,
            request.variant,
        )
        .await
    })
    .await?;

    Ok(Json(outcome.into()))
}

/// POST /api/v1/quizzes/baseline
///
/// Returns the company's baseline quiz, regenerating it when module content changed.
pub async fn handle_baseline_quiz(
    State(state): State<AppState>,
    Json(request): Json<BaselineQuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    if request.module_ids.is_empty() {
        return Err(AppError::Validation(
            "moduleIds must contain at least one module".to_string(),
        ));
    }

    let store = Arc::clone(&state.store);
    let llm = Arc::clone(&state.llm);

    let outcome = run_detached(async move {
        get_or_create_baseline_quiz(
            store.as_ref(),
            llm.as_ref(),
            request.company_id,
            &request.module_ids,
            request.training_id,
        )
        .await
    })
    .await?;

    Ok(Json(outcome.into()))
}
