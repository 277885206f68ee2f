//! Grading Engine: scores a submitted answer sheet against a question set.
//!
//! Closed-form questions (mcq, true/false, multiple select, matching,
//! ordering) are compared locally and deterministically. Free-text types,
//! unrecognized shapes and answers whose shape does not fit the question are
//! delegated to rubric grading. Local verdicts always take precedence over
//! the rubric's, and a rubric failure never fails the grade.
//!
//! Every question is worth one point: `max_score` is the question count.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::grading::rubric::{grade_by_rubric, RubricVerdicts};
use crate::llm_client::TextGenerator;
use crate::models::question::{Question, QuestionKind, SubmittedAnswer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub score: u32,
    pub max_score: u32,
    pub per_question: Vec<bool>,
    pub explanations: Vec<String>,
}

/// Outcome of comparing one answer without the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalVerdict {
    Correct,
    Incorrect,
    Delegate,
}

impl From<bool> for LocalVerdict {
    fn from(correct: bool) -> Self {
        if correct {
            LocalVerdict::Correct
        } else {
            LocalVerdict::Incorrect
        }
    }
}

/// Grades `answers` (index-aligned with `questions`; missing entries count
/// as unanswered). The generator is only called when some question needs it.
pub async fn grade<G>(
    llm: &G,
    questions: &[Question],
    answers: &[Option<SubmittedAnswer>],
) -> GradeReport
where
    G: TextGenerator + ?Sized,
{
    let verdicts: Vec<LocalVerdict> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| local_verdict(q, answer_at(answers, i)))
        .collect();

    let rubric = if verdicts.contains(&LocalVerdict::Delegate) {
        match grade_by_rubric(llm, questions, answers).await {
            Ok(rubric) => Some(rubric),
            Err(e) => {
                warn!("Rubric grading failed, falling back to local results: {e}");
                None
            }
        }
    } else {
        None
    };

    assemble(questions, answers, &verdicts, rubric.as_ref())
}

fn answer_at(answers: &[Option<SubmittedAnswer>], index: usize) -> Option<&SubmittedAnswer> {
    answers.get(index).and_then(Option::as_ref)
}

fn assemble(
    questions: &[Question],
    answers: &[Option<SubmittedAnswer>],
    verdicts: &[LocalVerdict],
    rubric: Option<&RubricVerdicts>,
) -> GradeReport {
    let mut per_question = Vec::with_capacity(questions.len());
    let mut explanations = Vec::with_capacity(questions.len());

    for (i, (question, verdict)) in questions.iter().zip(verdicts).enumerate() {
        let rubric_explanation = rubric.and_then(|r| r.explanation(i));

        let (correct, explanation) = match verdict {
            LocalVerdict::Correct | LocalVerdict::Incorrect => {
                let correct = *verdict == LocalVerdict::Correct;
                (correct, explain(question, correct, rubric_explanation))
            }
            LocalVerdict::Delegate => match rubric.and_then(|r| r.is_correct(i)) {
                Some(correct) => (correct, explain(question, correct, rubric_explanation)),
                None => match fallback_verdict(question, answer_at(answers, i)) {
                    Some(correct) => (correct, explain(question, correct, None)),
                    None => (false, String::new()),
                },
            },
        };

        per_question.push(correct);
        explanations.push(explanation);
    }

    GradeReport {
        score: per_question.iter().filter(|c| **c).count() as u32,
        max_score: questions.len() as u32,
        per_question,
        explanations,
    }
}

/// Rubric explanation when there is one, otherwise the verdict plus the stored explanation.
fn explain(question: &Question, correct: bool, rubric_explanation: Option<&str>) -> String {
    if let Some(text) = rubric_explanation {
        return text.to_string();
    }
    let verdict = if correct { "Correct" } else { "Incorrect" };
    match stored_explanation(question) {
        Some(text) => format!("{verdict}. {text}"),
        None => verdict.to_string(),
    }
}

fn stored_explanation(question: &Question) -> Option<&str> {
    let text = match question {
        Question::Known(q) => q.explanation.as_deref(),
        Question::Unrecognized(raw) => raw.get("explanation").and_then(Value::as_str),
    }?;
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

/// Local grading for delegated questions when the rubric gave no verdict.
fn fallback_verdict(question: &Question, answer: Option<&SubmittedAnswer>) -> Option<bool> {
    match question {
        Question::Known(q) => match &q.kind {
            QuestionKind::FillInBlank { accepted_answers } if !accepted_answers.is_empty() => {
                Some(answer.is_some_and(|a| matches_accepted(accepted_answers, a)))
            }
            _ => None,
        },
        Question::Unrecognized(_) => None,
    }
}

fn matches_accepted(accepted: &[String], answer: &SubmittedAnswer) -> bool {
    let submitted = match answer {
        SubmittedAnswer::Text(text) => text.as_str(),
        SubmittedAnswer::Values(values) if values.len() == 1 => values[0].as_str(),
        _ => return false,
    };
    let submitted = fold(submitted);
    accepted.iter().any(|a| fold(a) == submitted)
}

fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Compares one answer locally. Pure: same inputs, same verdict.
pub fn local_verdict(question: &Question, answer: Option<&SubmittedAnswer>) -> LocalVerdict {
    let Some(answer) = answer else {
        return LocalVerdict::Incorrect;
    };
    let Question::Known(question) = question else {
        return LocalVerdict::Delegate;
    };

    match &question.kind {
        QuestionKind::Mcq {
            options,
            correct_index,
        } => match answer {
            SubmittedAnswer::Choice(index) => (index == correct_index).into(),
            SubmittedAnswer::Text(text) => match options.iter().position(|o| o == text) {
                Some(index) => (index == *correct_index).into(),
                None => LocalVerdict::Delegate,
            },
            _ => LocalVerdict::Delegate,
        },

        // Index form follows the usual ["True", "False"] option order.
        QuestionKind::TrueFalse { correct_answer } => {
            let submitted = match answer {
                SubmittedAnswer::Flag(flag) => Some(*flag),
                SubmittedAnswer::Choice(0) => Some(true),
                SubmittedAnswer::Choice(1) => Some(false),
                SubmittedAnswer::Text(text) => match text.trim().to_lowercase().as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                },
                _ => None,
            };
            submitted.map_or(LocalVerdict::Delegate, |s| (s == *correct_answer).into())
        }

        QuestionKind::MultipleSelect {
            options,
            correct_indices,
        } => {
            let expected: BTreeSet<&str> = correct_indices
                .iter()
                .filter_map(|i| options.get(*i).map(String::as_str))
                .collect();
            match answer {
                SubmittedAnswer::Choices(indices) => {
                    let mut selected = BTreeSet::new();
                    for index in indices {
                        match options.get(*index) {
                            Some(option) => selected.insert(option.as_str()),
                            None => return LocalVerdict::Incorrect,
                        };
                    }
                    (selected == expected).into()
                }
                SubmittedAnswer::Values(values) => {
                    let selected: BTreeSet<&str> = values.iter().map(|v| v.trim()).collect();
                    (selected == expected).into()
                }
                _ => LocalVerdict::Delegate,
            }
        }

        QuestionKind::Matching { correct_matches, .. } => match answer {
            SubmittedAnswer::Pairs(pairs) => correct_matches
                .iter()
                .all(|(category, value)| pairs.get(category) == Some(value))
                .into(),
            _ => LocalVerdict::Delegate,
        },

        QuestionKind::Ordering {
            items,
            correct_order,
        } => match answer {
            SubmittedAnswer::Values(sequence) => (sequence == correct_order).into(),
            SubmittedAnswer::Choices(indices) => {
                let sequence: Option<Vec<&String>> =
                    indices.iter().map(|i| items.get(*i)).collect();
                match sequence {
                    Some(sequence) => sequence.into_iter().eq(correct_order.iter()).into(),
                    None => LocalVerdict::Incorrect,
                }
            }
            _ => LocalVerdict::Delegate,
        },

        QuestionKind::FillInBlank { .. }
        | QuestionKind::OpenEnded { .. }
        | QuestionKind::Scenario { .. } => LocalVerdict::Delegate,
    }
}
