use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::learning_style::LearningStyle;
use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Baseline,
    Module,
}

impl AssessmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentKind::Baseline => "baseline",
            AssessmentKind::Module => "module",
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(AssessmentKind::Baseline),
            "module" => Ok(AssessmentKind::Module),
            other => Err(anyhow!("unknown assessment kind '{other}'")),
        }
    }
}

/// Module quiz variant: a learning style, or the unstyled default.
/// Stored and sent as a plain string key (`"default"` or the style name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "String")]
pub struct QuizVariant(Option<LearningStyle>);

impl QuizVariant {
    pub const DEFAULT_KEY: &'static str = "default";

    pub fn style(&self) -> Option<LearningStyle> {
        self.0
    }

    pub fn as_key(&self) -> &'static str {
        self.0.map_or(Self::DEFAULT_KEY, |style| style.as_str())
    }
}

impl TryFrom<Option<String>> for QuizVariant {
    type Error = String;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value.as_deref().map(str::trim) {
            None | Some("") | Some(Self::DEFAULT_KEY) => Ok(Self(None)),
            Some(key) => key.parse().map(|style| Self(Some(style))),
        }
    }
}

impl From<LearningStyle> for QuizVariant {
    fn from(style: LearningStyle) -> Self {
        Self(Some(style))
    }
}

impl From<QuizVariant> for String {
    fn from(variant: QuizVariant) -> Self {
        variant.as_key().to_string()
    }
}

/// The uniqueness key of an assessment: at most one record exists per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AssessmentScope {
    Baseline { company_id: Uuid },
    Module { module_id: Uuid, variant: QuizVariant },
}

impl AssessmentScope {
    pub fn kind(&self) -> AssessmentKind {
        match self {
            AssessmentScope::Baseline { .. } => AssessmentKind::Baseline,
            AssessmentScope::Module { .. } => AssessmentKind::Module,
        }
    }
}

impl fmt::Display for AssessmentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentScope::Baseline { company_id } => write!(f, "baseline:{company_id}"),
            AssessmentScope::Module { module_id, variant } => {
                write!(f, "module:{module_id}:{}", variant.as_key())
            }
        }
    }
}

/// A persisted, generated question set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub scope: AssessmentScope,
    pub training_id: Option<Uuid>,
    pub questions: Vec<Question>,
    /// Content fingerprint the questions were generated from (baseline only).
    pub content_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentRecord {
    pub fn kind(&self) -> AssessmentKind {
        self.scope.kind()
    }
}

/// Fields needed to insert an assessment.
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub scope: AssessmentScope,
    pub training_id: Option<Uuid>,
    pub questions: Vec<Question>,
    pub content_fingerprint: Option<String>,
}

/// In-place replacement of a record's generated content. Identity is kept.
#[derive(Debug, Clone)]
pub struct AssessmentUpdate {
    pub questions: Vec<Question>,
    pub content_fingerprint: Option<String>,
    pub training_id: Option<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub kind: String,
    pub company_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub variant: Option<String>,
    pub training_id: Option<Uuid>,
    pub questions: Json<Vec<Question>>,
    pub content_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AssessmentRow> for AssessmentRecord {
    type Error = anyhow::Error;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        let scope = match row.kind.parse::<AssessmentKind>()? {
            AssessmentKind::Baseline => AssessmentScope::Baseline {
                company_id: row
                    .company_id
                    .with_context(|| format!("baseline assessment {} has no company_id", row.id))?,
            },
            AssessmentKind::Module => AssessmentScope::Module {
                module_id: row
                    .module_id
                    .with_context(|| format!("module assessment {} has no module_id", row.id))?,
                variant: QuizVariant::try_from(row.variant).map_err(anyhow::Error::msg)?,
            },
        };

        Ok(Self {
            id: row.id,
            scope,
            training_id: row.training_id,
            questions: row.questions.0,
            content_fingerprint: row.content_fingerprint,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
