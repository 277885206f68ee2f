//! Learning Plan Synthesizer: builds a study plan from an employee's graded
//! assessment history and keeps it until that history changes.
//!
//! The history is partitioned into baseline and module attempts by the kind
//! of the referenced assessment, serialized, and hashed. The assigned plan is
//! reused while its stored hash matches; otherwise a new plan is generated
//! and written over the assigned row (or inserted when there is none).

use anyhow::Context;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{strip_json_fences, TextGenerator};
use crate::models::assessment::AssessmentKind;
use crate::models::plan::PlanBody;
use crate::models::submission::SubmissionRecord;
use crate::planning::prompts::{PLAN_PROMPT_TEMPLATE, PLAN_SYSTEM};
use crate::store::{ContentSource, LearningPlanStore, SubmissionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Cached,
    Generated,
    Regenerated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: PlanBody,
    pub source: PlanSource,
    /// Set when the plan was produced but could not be stored.
    pub persistence_error: Option<String>,
}

/// The hashed view of one submission. Timestamps and ids of the submission
/// row are left out so re-reading the same history hashes the same.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry<'a> {
    assessment_id: Uuid,
    score: i32,
    max_score: i32,
    feedback: &'a str,
    question_feedback: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentHistory<'a> {
    baseline_submissions: Vec<HistoryEntry<'a>>,
    module_submissions: Vec<HistoryEntry<'a>>,
}

impl<'a> AssessmentHistory<'a> {
    fn from_submissions(submissions: &'a [SubmissionRecord]) -> Self {
        let mut ordered: Vec<&SubmissionRecord> = submissions.iter().collect();
        ordered.sort_by_key(|s| (s.created_at, s.id));

        let mut history = Self {
            baseline_submissions: Vec::new(),
            module_submissions: Vec::new(),
        };
        for submission in ordered {
            let entry = HistoryEntry {
                assessment_id: submission.assessment_id,
                score: submission.score,
                max_score: submission.max_score,
                feedback: &submission.feedback,
                question_feedback: &submission.question_feedback,
            };
            match submission.assessment_kind {
                AssessmentKind::Baseline => history.baseline_submissions.push(entry),
                AssessmentKind::Module => history.module_submissions.push(entry),
            }
        }
        history
    }

    fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self).context("Failed to serialize assessment history")?)
    }
}

fn plan_hash(history_json: &str) -> String {
    hex::encode(Sha256::digest(history_json.as_bytes()))
}

/// Returns the employee's learning plan, regenerating it when their
/// assessment history has changed since it was stored.
pub async fn synthesize_plan<S, G>(
    store: &S,
    llm: &G,
    employee_id: Uuid,
) -> Result<PlanOutcome, AppError>
where
    S: SubmissionStore + LearningPlanStore + ContentSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    let submissions = store.list_submissions(employee_id).await?;
    if submissions.is_empty() {
        return Err(AppError::Validation(format!(
            "Employee {employee_id} has no graded assessments yet"
        )));
    }

    let history = AssessmentHistory::from_submissions(&submissions);
    let history_json = history.to_json()?;
    let hash = plan_hash(&history_json);

    let current = store.find_assigned_plan(employee_id).await?;
    if let Some(plan) = current.as_ref().filter(|p| p.assessment_hash == hash) {
        debug!("Assigned plan {} for employee {employee_id} is current", plan.id);
        return Ok(PlanOutcome {
            plan: plan.body.clone(),
            source: PlanSource::Cached,
            persistence_error: None,
        });
    }

    info!(
        "Generating learning plan for employee {employee_id} ({} baseline, {} module submissions)",
        history.baseline_submissions.len(),
        history.module_submissions.len()
    );

    let descriptors = store.list_employee_descriptors(employee_id).await?;
    let modules: Vec<Value> = descriptors
        .iter()
        .filter(|d| d.title.is_some())
        .map(|d| {
            json!({
                "title": d.title,
                "summary": d.summary,
                "objectives": d.objectives,
            })
        })
        .collect();

    let prompt = PLAN_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{history_json}", &history_json)
        .replace("{modules_json}", &format!("{:#}", Value::Array(modules)));

    let text = llm.complete(&prompt, PLAN_SYSTEM).await.map_err(|e| {
        error!("Learning plan generation failed for employee {employee_id}: {e}");
        AppError::Llm(e.to_string())
    })?;
    let body = parse_plan(&text)?;

    let (source, stored) = match current {
        Some(existing) => (
            PlanSource::Regenerated,
            store.update_plan(existing.id, &body, &hash).await,
        ),
        None => (
            PlanSource::Generated,
            store.insert_assigned_plan(employee_id, &body, &hash).await,
        ),
    };

    let persistence_error = match stored {
        Ok(plan) => {
            info!("Stored learning plan {} for employee {employee_id}", plan.id);
            None
        }
        Err(e) => {
            error!("Failed to store learning plan for employee {employee_id}: {e}");
            Some(e.to_string())
        }
    };

    Ok(PlanOutcome {
        plan: body,
        source,
        persistence_error,
    })
}

/// Reads a plan from generator text. Fences and a `{"plan": …}` wrapper are tolerated.
fn parse_plan(text: &str) -> Result<PlanBody, AppError> {
    let mut value: Value = serde_json::from_str(strip_json_fences(text)).map_err(|e| {
        error!("Learning plan response is not JSON: {e}");
        AppError::Llm(format!("Learning plan response is not JSON: {e}"))
    })?;

    if value.get("modules").is_none() {
        if let Some(inner) = value.get_mut("plan").map(Value::take) {
            value = inner;
        }
    }

    serde_json::from_value(value).map_err(|e| {
        error!("Learning plan response has the wrong shape: {e}");
        AppError::Llm(format!("Learning plan response has the wrong shape: {e}"))
    })
}
