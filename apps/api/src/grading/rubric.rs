//! Rubric delegation: asks the generator to grade a whole question set.
//!
//! The response is parsed leniently. Verdicts may come back as booleans,
//! numbers or strings; explanations may be missing or null. Whatever cannot
//! be read is left as `None` for the engine to fall back on.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::grading::prompts::{RUBRIC_PROMPT_TEMPLATE, RUBRIC_SYSTEM};
use crate::llm_client::{complete_json, LlmError, TextGenerator};
use crate::models::question::{Question, SubmittedAnswer};

/// Per-question rubric results, index-aligned with the graded questions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RubricVerdicts {
    correct: Vec<Option<bool>>,
    explanations: Vec<Option<String>>,
}

impl RubricVerdicts {
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        self.correct.get(index).copied().flatten()
    }

    pub fn explanation(&self, index: usize) -> Option<&str> {
        self.explanations.get(index).and_then(Option::as_deref)
    }
}

#[derive(Debug, Deserialize)]
struct RawRubric {
    #[serde(
        rename = "perQuestion",
        default,
        alias = "per_question",
        alias = "perQuestionCorrect",
        alias = "per_question_correct",
        alias = "results"
    )]
    per_question: Vec<Value>,
    #[serde(default)]
    explanations: Vec<Value>,
}

impl From<RawRubric> for RubricVerdicts {
    fn from(raw: RawRubric) -> Self {
        Self {
            correct: raw.per_question.iter().map(read_verdict).collect(),
            explanations: raw
                .explanations
                .iter()
                .map(|e| {
                    e.as_str()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect(),
        }
    }
}

fn read_verdict(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n > 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "correct" | "yes" => Some(true),
            "false" | "incorrect" | "no" => Some(false),
            _ => None,
        },
        Value::Object(map) => map.get("correct").and_then(read_verdict),
        _ => None,
    }
}

/// Sends every question with its submitted answer for rubric grading.
pub async fn grade_by_rubric<G>(
    llm: &G,
    questions: &[Question],
    answers: &[Option<SubmittedAnswer>],
) -> Result<RubricVerdicts, LlmError>
where
    G: TextGenerator + ?Sized,
{
    let items: Vec<Value> = questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            json!({
                "index": index,
                "question": question,
                "submittedAnswer": answers.get(index).cloned().flatten(),
            })
        })
        .collect();

    let prompt = RUBRIC_PROMPT_TEMPLATE
        .replace("{question_count}", &questions.len().to_string())
        .replace("{items_json}", &format!("{:#}", Value::Array(items)));

    let raw: RawRubric = complete_json(llm, &prompt, RUBRIC_SYSTEM).await?;
    debug!(
        "Rubric returned {} verdicts for {} questions",
        raw.per_question.len(),
        questions.len()
    );
    Ok(raw.into())
}
