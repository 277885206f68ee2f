use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Assigned,
    Superseded,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Assigned => "assigned",
            PlanStatus::Superseded => "superseded",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(PlanStatus::Assigned),
            "superseded" => Ok(PlanStatus::Superseded),
            other => Err(anyhow!("unknown plan status '{other}'")),
        }
    }
}

/// The generated study plan: modules in recommended order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBody {
    pub modules: Vec<PlannedModule>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedModule {
    #[serde(alias = "module", alias = "name")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub objectives: Vec<String>,
    #[serde(
        default,
        alias = "recommendedTime",
        alias = "recommended_hours",
        alias = "hours",
        deserialize_with = "lenient_hours"
    )]
    pub recommended_hours: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tips: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Hours arrive as a number, a string such as `"2 hours"`, or null.
/// Anything without a leading number reads as zero.
fn lenient_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => leading_number(&s),
        _ => 0.0,
    })
}

fn leading_number(text: &str) -> f64 {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub body: PlanBody,
    pub status: PlanStatus,
    pub assessment_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LearningPlanRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub plan: Json<PlanBody>,
    pub status: String,
    pub assessment_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LearningPlanRow> for LearningPlan {
    type Error = anyhow::Error;

    fn try_from(row: LearningPlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            employee_id: row.employee_id,
            body: row.plan.0,
            status: row.status.parse()?,
            assessment_hash: row.assessment_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_body_accepts_generator_aliases() {
        let body: PlanBody = serde_json::from_str(
            r#"{
                "modules": [
                    {"module": "Fire Safety", "recommendedTime": 1.5, "objectives": ["Use an extinguisher"]},
                    {"title": "Data Privacy"}
                ],
                "tips": ["Review PPE rules first"]
            }"#,
        )
        .unwrap();

        assert_eq!(body.modules.len(), 2);
        assert_eq!(body.modules[0].title, "Fire Safety");
        assert!((body.modules[0].recommended_hours - 1.5).abs() < f64::EPSILON);
        assert_eq!(body.modules[1].recommended_hours, 0.0);
    }

    #[test]
    fn test_hours_and_lists_are_read_leniently() {
        let body: PlanBody = serde_json::from_str(
            r#"{
                "modules": [
                    {"title": "Fire Safety", "recommendedTime": "2 hours", "tips": null},
                    {"title": "Data Privacy", "recommendedHours": null, "objectives": null},
                    {"title": "Ethics", "hours": "about an hour"},
                    {"title": "Onboarding", "recommendedHours": " 1.5h"}
                ],
                "tips": null
            }"#,
        )
        .unwrap();

        let hours: Vec<f64> = body.modules.iter().map(|m| m.recommended_hours).collect();
        assert_eq!(hours, vec![2.0, 0.0, 0.0, 1.5]);
        assert!(body.modules[0].tips.is_empty());
        assert!(body.modules[1].objectives.is_empty());
        assert!(body.tips.is_empty());
    }

    #[test]
    fn test_plan_body_requires_modules() {
        assert!(serde_json::from_str::<PlanBody>(r#"{"tips": []}"#).is_err());
    }
}
