//! Assessment Cache Controller: decides between serving a stored quiz,
//! generating a new one, and regenerating one whose content changed.
//!
//! Module quizzes are keyed by (module, variant) and never invalidated.
//! Baseline quizzes are keyed by company and carry a content fingerprint;
//! each request classifies the stored record as Absent, Fresh or Stale.
//!
//! Nothing is written until a non-empty, validated question set exists.
//! The store's uniqueness constraint is the correctness backstop for
//! concurrent requests; the re-check before insert only saves a write.

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::assessment::generator::{generate_questions, QuizContent};
use crate::assessment::snapshot::normalize;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::assessment::{
    AssessmentRecord, AssessmentScope, AssessmentUpdate, NewAssessment, QuizVariant,
};
use crate::models::question::Question;
use crate::store::{AssessmentStore, ContentSource, InsertOutcome};

/// Extra generator attempts when a response yields no usable questions.
const MAX_EMPTY_GENERATION_RETRIES: u32 = 1;

/// How the returned question set was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
    Cached,
    Generated,
    Regenerated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub assessment_id: Uuid,
    pub questions: Vec<Question>,
    pub source: QuizSource,
}

impl QuizOutcome {
    fn from_record(record: AssessmentRecord, source: QuizSource) -> Self {
        Self {
            assessment_id: record.id,
            questions: record.questions,
            source,
        }
    }
}

/// Cache state of a baseline scope. Computed per request, never stored.
#[derive(Debug)]
enum CacheState {
    Absent,
    Fresh(AssessmentRecord),
    Stale(AssessmentRecord),
}

impl CacheState {
    /// A record without a fingerprint predates fingerprinting and counts as stale.
    fn classify(existing: Option<AssessmentRecord>, fingerprint: &str) -> Self {
        match existing {
            None => CacheState::Absent,
            Some(record) if record.content_fingerprint.as_deref() == Some(fingerprint) => {
                CacheState::Fresh(record)
            }
            Some(record) => CacheState::Stale(record),
        }
    }
}

/// Returns the quiz for a module and variant, generating it on first request.
pub async fn get_or_create_module_quiz<S, G>(
    store: &S,
    llm: &G,
    module_id: Uuid,
    variant: QuizVariant,
) -> Result<QuizOutcome, AppError>
where
    S: AssessmentStore + ContentSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    let scope = AssessmentScope::Module { module_id, variant };

    if let Some(record) = store.find_by_scope(&scope).await? {
        debug!("Serving stored quiz {} for {scope}", record.id);
        return Ok(QuizOutcome::from_record(record, QuizSource::Cached));
    }

    let descriptor = store
        .get_module_descriptor(module_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Module {module_id} not found")))?;

    let summary = descriptor
        .summary
        .clone()
        .or_else(|| descriptor.title.clone())
        .unwrap_or_default();
    let objectives = descriptor.objectives.clone();
    let descriptors = [descriptor];
    let content = QuizContent {
        summary: &summary,
        descriptors: &descriptors,
        objectives: &objectives,
        style: variant.style(),
    };

    info!("No stored quiz for {scope}; generating");
    let questions = generate_usable(llm, &content, &scope).await?;

    // Another request may have stored this scope while we were generating.
    if let Some(record) = store.find_by_scope(&scope).await? {
        info!("Quiz for {scope} was stored concurrently; discarding generated set");
        return Ok(QuizOutcome::from_record(record, QuizSource::Cached));
    }

    let new = NewAssessment {
        scope,
        training_id: None,
        questions,
        content_fingerprint: None,
    };
    let outcome = store.insert_assessment(&new).await?;
    match outcome {
        InsertOutcome::Inserted(record) => {
            info!(
                "Stored quiz {} for {scope} ({} questions)",
                record.id,
                record.questions.len()
            );
            Ok(QuizOutcome::from_record(record, QuizSource::Generated))
        }
        InsertOutcome::Existing(record) => {
            info!("Insert for {scope} lost to a concurrent writer; serving stored quiz");
            Ok(QuizOutcome::from_record(record, QuizSource::Cached))
        }
    }
}

/// Returns the company's baseline quiz over `module_ids`, regenerating it in
/// place when the modules' content fingerprint no longer matches.
pub async fn get_or_create_baseline_quiz<S, G>(
    store: &S,
    llm: &G,
    company_id: Uuid,
    module_ids: &[Uuid],
    training_id: Option<Uuid>,
) -> Result<QuizOutcome, AppError>
where
    S: AssessmentStore + ContentSource + ?Sized,
    G: TextGenerator + ?Sized,
{
    if module_ids.is_empty() {
        return Err(AppError::Validation(
            "moduleIds must contain at least one module".to_string(),
        ));
    }

    let descriptors = store.list_descriptors(company_id, module_ids).await?;
    if descriptors.is_empty() {
        return Err(AppError::NotFound(format!(
            "None of the requested modules exist for company {company_id}"
        )));
    }

    let fingerprint = normalize(&descriptors).fingerprint();
    let scope = AssessmentScope::Baseline { company_id };

    let stale = match CacheState::classify(store.find_by_scope(&scope).await?, &fingerprint) {
        CacheState::Fresh(record) => {
            debug!("Baseline {} for {scope} is fresh", record.id);
            return Ok(QuizOutcome::from_record(record, QuizSource::Cached));
        }
        CacheState::Stale(record) => {
            info!("Baseline {} for {scope} is stale; regenerating", record.id);
            Some(record)
        }
        CacheState::Absent => {
            info!("No baseline for {scope}; generating");
            None
        }
    };

    let summary = descriptors
        .iter()
        .filter_map(|d| d.summary.as_deref().or(d.title.as_deref()))
        .collect::<Vec<_>>()
        .join("\n");
    let objectives: Vec<String> = descriptors
        .iter()
        .flat_map(|d| d.objectives.iter().cloned())
        .collect();
    let content = QuizContent {
        summary: &summary,
        descriptors: &descriptors,
        objectives: &objectives,
        style: None,
    };
    let questions = generate_usable(llm, &content, &scope).await?;

    if let Some(record) = stale {
        return regenerate_in_place(store, record.id, questions, fingerprint, training_id).await;
    }

    let new = NewAssessment {
        scope,
        training_id,
        questions,
        content_fingerprint: Some(fingerprint),
    };
    let outcome = store.insert_assessment(&new).await?;
    match outcome {
        InsertOutcome::Inserted(record) => {
            info!("Stored baseline {} for {scope}", record.id);
            Ok(QuizOutcome::from_record(record, QuizSource::Generated))
        }
        InsertOutcome::Existing(record)
            if record.content_fingerprint == new.content_fingerprint =>
        {
            info!("Baseline for {scope} was stored concurrently with the same content");
            Ok(QuizOutcome::from_record(record, QuizSource::Cached))
        }
        InsertOutcome::Existing(record) => {
            warn!(
                "Baseline {} for {scope} was stored concurrently from other content; overwriting",
                record.id
            );
            let NewAssessment {
                questions,
                content_fingerprint,
                training_id,
                ..
            } = new;
            regenerate_in_place(
                store,
                record.id,
                questions,
                content_fingerprint.unwrap_or_default(),
                training_id,
            )
            .await
        }
    }
}

async fn regenerate_in_place<S>(
    store: &S,
    id: Uuid,
    questions: Vec<Question>,
    fingerprint: String,
    training_id: Option<Uuid>,
) -> Result<QuizOutcome, AppError>
where
    S: AssessmentStore + ?Sized,
{
    let update = AssessmentUpdate {
        questions,
        content_fingerprint: Some(fingerprint),
        training_id,
    };
    let record = store.update_assessment(id, &update).await?;
    info!("Regenerated baseline {} in place", record.id);
    Ok(QuizOutcome::from_record(record, QuizSource::Regenerated))
}

/// Runs the generator until it yields questions, retrying once on an empty set.
async fn generate_usable<G>(
    llm: &G,
    content: &QuizContent<'_>,
    scope: &AssessmentScope,
) -> Result<Vec<Question>, AppError>
where
    G: TextGenerator + ?Sized,
{
    for attempt in 0..=MAX_EMPTY_GENERATION_RETRIES {
        let questions = generate_questions(llm, content).await.map_err(|e| {
            error!("Quiz generation for {scope} failed: {e}");
            AppError::Llm(e.to_string())
        })?;
        if !questions.is_empty() {
            return Ok(questions);
        }
        warn!(
            "Quiz generation for {scope} produced no usable questions (attempt {})",
            attempt + 1
        );
    }

    Err(AppError::Llm(format!(
        "Quiz generation for {scope} produced no usable questions"
    )))
}
