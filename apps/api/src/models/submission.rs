use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::assessment::AssessmentKind;

/// An employee's graded attempt at an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub assessment_id: Uuid,
    /// Kind of the referenced assessment, not of the submission itself.
    pub assessment_kind: AssessmentKind,
    pub answers: Value,
    pub score: i32,
    pub max_score: i32,
    pub feedback: String,
    pub question_feedback: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub employee_id: Uuid,
    pub assessment_id: Uuid,
    pub assessment_kind: AssessmentKind,
    pub answers: Value,
    pub score: i32,
    pub max_score: i32,
    pub feedback: String,
    pub question_feedback: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub assessment_id: Uuid,
    pub assessment_kind: String,
    pub answers: Value,
    pub score: i32,
    pub max_score: i32,
    pub feedback: String,
    pub question_feedback: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for SubmissionRecord {
    type Error = anyhow::Error;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            assessment_id: row.assessment_id,
            assessment_kind: row.assessment_kind.parse()?,
            answers: row.answers,
            score: row.score,
            max_score: row.max_score,
            feedback: row.feedback,
            question_feedback: row.question_feedback.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
