//! Learning-style survey scoring and recording.
//!
//! Each style owns a block of ten consecutive items; the style whose block
//! sums highest wins, ties going to the earlier block.

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::learning_style::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, SURVEY_ITEMS};
use crate::llm_client::{complete_json, TextGenerator};
use crate::models::learning_style::{LearningStyle, NewLearningStyle};
use crate::store::LearningStyleStore;

const ITEMS_PER_STYLE: usize = 10;
pub const SURVEY_LENGTH: usize = ITEMS_PER_STYLE * LearningStyle::ALL.len();
const MIN_ANSWER: u8 = 1;
const MAX_ANSWER: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyResult {
    pub learning_style: LearningStyle,
    pub analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    analysis: String,
}

/// Checks the answer sheet shape: exactly one 1–5 answer per survey item.
pub fn validate_answers(answers: &[u8]) -> Result<(), AppError> {
    if answers.len() != SURVEY_LENGTH {
        return Err(AppError::Validation(format!(
            "Expected {SURVEY_LENGTH} answers, got {}",
            answers.len()
        )));
    }
    if let Some((index, answer)) = answers
        .iter()
        .enumerate()
        .find(|(_, a)| !(MIN_ANSWER..=MAX_ANSWER).contains(*a))
    {
        return Err(AppError::Validation(format!(
            "Answer {} is {answer}; answers must be between {MIN_ANSWER} and {MAX_ANSWER}",
            index + 1
        )));
    }
    Ok(())
}

/// Dominant style for a validated answer sheet.
pub fn classify(answers: &[u8]) -> LearningStyle {
    let mut best = LearningStyle::ALL[0];
    let mut best_total = 0u32;

    for (block, style) in answers.chunks(ITEMS_PER_STYLE).zip(LearningStyle::ALL) {
        let total: u32 = block.iter().map(|a| u32::from(*a)).sum();
        if total > best_total {
            best = style;
            best_total = total;
        }
    }
    best
}

/// Asks the generator to explain the classification. `None` on any failure.
pub async fn analyze<G>(llm: &G, answers: &[u8], style: LearningStyle) -> Option<String>
where
    G: TextGenerator + ?Sized,
{
    let responses = SURVEY_ITEMS
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(i, (item, answer))| format!("Q{}: {item}\nA{}: {answer}", i + 1, i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{style_name}", style.as_str())
        .replace("{style_hint}", style.style_hint())
        .replace("{responses}", &responses);

    match complete_json::<AnalysisResponse, _>(llm, &prompt, ANALYSIS_SYSTEM).await {
        Ok(response) if !response.analysis.trim().is_empty() => {
            Some(response.analysis.trim().to_string())
        }
        Ok(_) => None,
        Err(e) => {
            warn!("Learning style analysis failed: {e}");
            None
        }
    }
}

/// Scores and stores an employee's survey. Each employee submits once.
pub async fn submit_survey<S, G>(
    store: &S,
    llm: &G,
    employee_id: Uuid,
    answers: Vec<u8>,
) -> Result<SurveyResult, AppError>
where
    S: LearningStyleStore + ?Sized,
    G: TextGenerator + ?Sized,
{
    validate_answers(&answers)?;

    if store.find_learning_style(employee_id).await?.is_some() {
        return Err(already_submitted(employee_id));
    }

    let learning_style = classify(&answers);
    let analysis = analyze(llm, &answers, learning_style).await;

    let new = NewLearningStyle {
        employee_id,
        answers,
        learning_style,
        analysis,
    };
    if !store.insert_learning_style(&new).await? {
        return Err(already_submitted(employee_id));
    }
    info!("Recorded learning style {learning_style} for employee {employee_id}");

    Ok(SurveyResult {
        learning_style,
        analysis: new.analysis,
    })
}

fn already_submitted(employee_id: Uuid) -> AppError {
    AppError::Forbidden(format!(
        "Learning style already submitted for employee {employee_id}"
    ))
}
