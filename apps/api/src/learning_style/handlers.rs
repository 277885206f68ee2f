//! Axum route handlers for the learning-style survey.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::learning_style::classifier::submit_survey;
use crate::models::learning_style::LearningStyle;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRequest {
    pub employee_id: Uuid,
    pub answers: Vec<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub learning_style: LearningStyle,
    pub analysis: Option<String>,
}

/// POST /api/v1/learning-styles
///
/// Classifies and stores the employee's survey. A second submission is rejected.
pub async fn handle_submit_survey(
    State(state): State<AppState>,
    Json(request): Json<SurveyRequest>,
) -> Result<Json<SurveyResponse>, AppError> {
    let result = submit_survey(
        state.store.as_ref(),
        state.llm.as_ref(),
        request.employee_id,
        request.answers,
    )
    .await?;

    Ok(Json(SurveyResponse {
        learning_style: result.learning_style,
        analysis: result.analysis,
    }))
}
