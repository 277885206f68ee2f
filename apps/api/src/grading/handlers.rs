//! Axum route handlers for grading and submission history.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::grading::engine::{grade, GradeReport};
use crate::grading::feedback::{record_submission, summary_feedback};
use crate::models::question::{Question, SubmittedAnswer};
use crate::models::submission::SubmissionRecord;
use crate::state::AppState;
use crate::store::{AssessmentStore, SubmissionStore};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingRequest {
    /// Ignored when `assessmentId` resolves to a stored assessment.
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, alias = "userAnswers")]
    pub submitted_answers: Vec<Option<SubmittedAnswer>>,
    pub employee_id: Option<Uuid>,
    pub assessment_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResponse {
    #[serde(flatten)]
    pub report: GradeReport,
    pub feedback: String,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/grading
///
/// Grades the answers and returns score, explanations and coaching feedback.
/// With both `employeeId` and `assessmentId` the attempt is graded against the
/// stored assessment's questions and recorded; a recording failure is reported
/// alongside the grade instead of replacing it.
pub async fn handle_grade(
    State(state): State<AppState>,
    Json(request): Json<GradingRequest>,
) -> Result<Json<GradingResponse>, AppError> {
    let target = match (request.employee_id, request.assessment_id) {
        (Some(employee_id), Some(assessment_id)) => {
            let assessment = state
                .store
                .get_assessment(assessment_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Assessment {assessment_id} not found"))
                })?;
            Some((employee_id, assessment))
        }
        _ => None,
    };

    // A stored assessment carries the answer key of record.
    let questions: &[Question] = match &target {
        Some((_, assessment)) => &assessment.questions,
        None => &request.questions,
    };
    if questions.is_empty() {
        return Err(AppError::Validation("questions cannot be empty".to_string()));
    }
    if request.submitted_answers.len() > questions.len() {
        return Err(AppError::Validation(format!(
            "submittedAnswers has {} entries for {} questions",
            request.submitted_answers.len(),
            questions.len()
        )));
    }

    let report = grade(state.llm.as_ref(), questions, &request.submitted_answers).await;
    info!(
        "Graded {} questions: {}/{}",
        questions.len(),
        report.score,
        report.max_score
    );

    let feedback = summary_feedback(
        state.llm.as_ref(),
        questions,
        &request.submitted_answers,
        &report,
    )
    .await;

    let (persisted, persistence_error) = match &target {
        Some((employee_id, assessment)) => match record_submission(
            state.store.as_ref(),
            *employee_id,
            assessment,
            &request.submitted_answers,
            &report,
            &feedback,
        )
        .await
        {
            Ok(_) => (true, None),
            Err(e) => {
                error!("Failed to record submission for employee {employee_id}: {e}");
                (false, Some(e.to_string()))
            }
        },
        None => (false, None),
    };

    Ok(Json(GradingResponse {
        report,
        feedback,
        persisted,
        persistence_error,
    }))
}

/// GET /api/v1/employees/:employee_id/submissions
///
/// Returns the employee's graded attempts with each assessment's kind.
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionRecord>>, AppError> {
    let submissions = state.store.list_submissions(employee_id).await?;
    Ok(Json(submissions))
}
