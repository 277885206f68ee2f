//! Question and answer shapes shared by quiz generation, storage, and grading.
//!
//! A question is tagged by `type` on the wire. Anything that does not match a
//! known shape is kept verbatim so it can still be graded by rubric.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single quiz question as stored and delivered to employees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Question {
    Known(TypedQuestion),
    Unrecognized(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedQuestion {
    #[serde(alias = "text")]
    pub question: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Per-type options and correct-answer references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    Mcq {
        options: Vec<String>,
        correct_index: usize,
    },
    #[serde(alias = "true/false")]
    TrueFalse { correct_answer: bool },
    MultipleSelect {
        options: Vec<String>,
        correct_indices: Vec<usize>,
    },
    /// `options` maps each category to the candidates offered for it.
    Matching {
        options: BTreeMap<String, Vec<String>>,
        correct_matches: BTreeMap<String, String>,
    },
    Ordering {
        items: Vec<String>,
        correct_order: Vec<String>,
    },
    #[serde(alias = "fill_in_the_blank")]
    FillInBlank {
        #[serde(default)]
        accepted_answers: Vec<String>,
    },
    OpenEnded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rubric: Option<String>,
    },
    Scenario {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scenario: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rubric: Option<String>,
    },
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::Mcq { .. } => "mcq",
            QuestionKind::TrueFalse { .. } => "true_false",
            QuestionKind::MultipleSelect { .. } => "multiple_select",
            QuestionKind::Matching { .. } => "matching",
            QuestionKind::Ordering { .. } => "ordering",
            QuestionKind::FillInBlank { .. } => "fill_in_blank",
            QuestionKind::OpenEnded { .. } => "open_ended",
            QuestionKind::Scenario { .. } => "scenario",
        }
    }
}

impl Question {
    /// Question text, or an empty string for unrecognized shapes without one.
    pub fn text(&self) -> &str {
        match self {
            Question::Known(q) => &q.question,
            Question::Unrecognized(raw) => raw
                .get("question")
                .or_else(|| raw.get("text"))
                .and_then(Value::as_str)
                .unwrap_or_default(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Question::Known(q) => q.kind.type_name(),
            Question::Unrecognized(raw) => raw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }
}

impl TypedQuestion {
    /// Structural checks applied to generator output before it may be stored.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        match &self.kind {
            QuestionKind::Mcq {
                options,
                correct_index,
            } => {
                if options.len() < 2 {
                    return Err(format!("mcq needs at least 2 options, got {}", options.len()));
                }
                if *correct_index >= options.len() {
                    return Err(format!(
                        "correctIndex {correct_index} out of range for {} options",
                        options.len()
                    ));
                }
            }
            QuestionKind::TrueFalse { .. } => {}
            QuestionKind::MultipleSelect {
                options,
                correct_indices,
            } => {
                if options.len() < 2 {
                    return Err("multiple_select needs at least 2 options".to_string());
                }
                if correct_indices.is_empty() {
                    return Err("multiple_select has no correct indices".to_string());
                }
                if let Some(bad) = correct_indices.iter().find(|i| **i >= options.len()) {
                    return Err(format!("correctIndices entry {bad} out of range"));
                }
            }
            QuestionKind::Matching {
                options,
                correct_matches,
            } => {
                if correct_matches.is_empty() {
                    return Err("matching has no correct matches".to_string());
                }
                for (category, value) in correct_matches {
                    let offered = options
                        .get(category)
                        .is_some_and(|candidates| candidates.contains(value));
                    if !offered {
                        return Err(format!(
                            "matching answer for '{category}' is not among its options"
                        ));
                    }
                }
            }
            QuestionKind::Ordering {
                items,
                correct_order,
            } => {
                if correct_order.len() < 2 {
                    return Err("ordering needs at least 2 items".to_string());
                }
                let mut expected = items.clone();
                let mut actual = correct_order.clone();
                expected.sort();
                actual.sort();
                if expected != actual {
                    return Err("correctOrder is not a permutation of items".to_string());
                }
            }
            QuestionKind::FillInBlank { .. }
            | QuestionKind::OpenEnded { .. }
            | QuestionKind::Scenario { .. } => {}
        }
        Ok(())
    }
}

/// One submitted answer. Its shape mirrors the question's options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Flag(bool),
    Choice(usize),
    Choices(Vec<usize>),
    Values(Vec<String>),
    Text(String),
    Pairs(BTreeMap<String, String>),
    Other(Value),
}
