use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Gregorc-style learning preference derived from the onboarding survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    #[serde(alias = "CS")]
    ConcreteSequential,
    #[serde(alias = "AS")]
    AbstractSequential,
    #[serde(alias = "AR")]
    AbstractRandom,
    #[serde(alias = "CR")]
    ConcreteRandom,
}

impl LearningStyle {
    /// Survey block order: items 1–10, 11–20, 21–30, 31–40.
    pub const ALL: [LearningStyle; 4] = [
        LearningStyle::ConcreteSequential,
        LearningStyle::AbstractSequential,
        LearningStyle::AbstractRandom,
        LearningStyle::ConcreteRandom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::ConcreteSequential => "concrete_sequential",
            LearningStyle::AbstractSequential => "abstract_sequential",
            LearningStyle::AbstractRandom => "abstract_random",
            LearningStyle::ConcreteRandom => "concrete_random",
        }
    }

    /// Presentation hint handed to the quiz generator.
    pub fn style_hint(&self) -> &'static str {
        match self {
            LearningStyle::ConcreteSequential => {
                "Concrete Sequential learner: prefers step-by-step procedures, checklists, \
                 and questions about exact rules and the order of actions."
            }
            LearningStyle::AbstractSequential => {
                "Abstract Sequential learner: prefers principles, evidence, and analysis; \
                 favour questions asking why a rule exists or what follows logically."
            }
            LearningStyle::AbstractRandom => {
                "Abstract Random learner: prefers stories and people; favour questions framed \
                 around colleagues, customers, and realistic workplace situations."
            }
            LearningStyle::ConcreteRandom => {
                "Concrete Random learner: prefers experimentation and challenge; favour \
                 problem-solving scenarios and questions about what to try next."
            }
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "concrete_sequential" | "CS" => Ok(LearningStyle::ConcreteSequential),
            "abstract_sequential" | "AS" => Ok(LearningStyle::AbstractSequential),
            "abstract_random" | "AR" => Ok(LearningStyle::AbstractRandom),
            "concrete_random" | "CR" => Ok(LearningStyle::ConcreteRandom),
            other => Err(format!("unknown learning style '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningStyleRow {
    pub employee_id: Uuid,
    pub answers: Value,
    pub learning_style: String,
    pub analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyleRecord {
    pub employee_id: Uuid,
    pub answers: Vec<u8>,
    pub learning_style: LearningStyle,
    pub analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LearningStyleRow> for LearningStyleRecord {
    type Error = anyhow::Error;

    fn try_from(row: LearningStyleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            employee_id: row.employee_id,
            answers: serde_json::from_value(row.answers)?,
            learning_style: row.learning_style.parse().map_err(anyhow::Error::msg)?,
            analysis: row.analysis,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewLearningStyle {
    pub employee_id: Uuid,
    pub answers: Vec<u8>,
    pub learning_style: LearningStyle,
    pub analysis: Option<String>,
}
