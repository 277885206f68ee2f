use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Snapshot of one training module's content as produced by ingestion.
/// The assessment core only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: Uuid,
    /// `None` marks a malformed descriptor; it is skipped by fingerprinting.
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TrainingModuleRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub topics: Vec<String>,
    pub objectives: Vec<String>,
}

impl From<TrainingModuleRow> for ModuleDescriptor {
    fn from(row: TrainingModuleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            summary: row.summary,
            topics: row.topics,
            objectives: row.objectives,
        }
    }
}
