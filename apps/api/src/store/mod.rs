//! Storage collaborators.
//!
//! Each concern is its own trait so components ask only for what they use.
//! `Store` bundles them for `AppState`; `PgStore` is the production backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{
    AssessmentRecord, AssessmentScope, AssessmentUpdate, NewAssessment,
};
use crate::models::content::ModuleDescriptor;
use crate::models::learning_style::{LearningStyleRecord, NewLearningStyle};
use crate::models::plan::{LearningPlan, PlanBody};
use crate::models::submission::{NewSubmission, SubmissionRecord};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Read-only view of ingested training content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_module_descriptor(
        &self,
        module_id: Uuid,
    ) -> Result<Option<ModuleDescriptor>, AppError>;

    /// Descriptors for `module_ids` that belong to `company_id`, in curriculum order.
    async fn list_descriptors(
        &self,
        company_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<Vec<ModuleDescriptor>, AppError>;

    /// Descriptors of every company whose assessments the employee has submitted.
    async fn list_employee_descriptors(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<ModuleDescriptor>, AppError>;
}

/// Result of an insert against the per-scope uniqueness constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(AssessmentRecord),
    /// Another writer got there first; this is the record of truth.
    Existing(AssessmentRecord),
}

impl InsertOutcome {
    #[cfg(test)]
    pub fn into_record(self) -> AssessmentRecord {
        match self {
            InsertOutcome::Inserted(record) | InsertOutcome::Existing(record) => record,
        }
    }
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Latest record for the scope, if any.
    async fn find_by_scope(
        &self,
        scope: &AssessmentScope,
    ) -> Result<Option<AssessmentRecord>, AppError>;

    async fn get_assessment(&self, id: Uuid) -> Result<Option<AssessmentRecord>, AppError>;

    /// Inserts unless a record already holds the scope. Never creates a duplicate.
    async fn insert_assessment(&self, new: &NewAssessment) -> Result<InsertOutcome, AppError>;

    async fn update_assessment(
        &self,
        id: Uuid,
        update: &AssessmentUpdate,
    ) -> Result<AssessmentRecord, AppError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Module attempts overwrite the employee's previous attempt; baseline attempts append.
    async fn record_submission(&self, new: &NewSubmission) -> Result<SubmissionRecord, AppError>;

    /// All submissions of an employee, oldest first, with the referenced assessment's kind.
    async fn list_submissions(&self, employee_id: Uuid)
        -> Result<Vec<SubmissionRecord>, AppError>;
}

#[async_trait]
pub trait LearningPlanStore: Send + Sync {
    async fn find_assigned_plan(&self, employee_id: Uuid)
        -> Result<Option<LearningPlan>, AppError>;

    async fn update_plan(
        &self,
        id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError>;

    /// Inserts an assigned plan, superseding any plan still assigned to the employee.
    async fn insert_assigned_plan(
        &self,
        employee_id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError>;
}

#[async_trait]
pub trait LearningStyleStore: Send + Sync {
    async fn find_learning_style(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<LearningStyleRecord>, AppError>;

    /// Returns `false` when the employee already has a recorded style.
    async fn insert_learning_style(&self, new: &NewLearningStyle) -> Result<bool, AppError>;
}

/// Everything the HTTP layer needs from the backing store.
pub trait Store:
    ContentSource + AssessmentStore + SubmissionStore + LearningPlanStore + LearningStyleStore
{
}

impl<T> Store for T where
    T: ContentSource + AssessmentStore + SubmissionStore + LearningPlanStore + LearningStyleStore
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_is_object_safe() {
        fn _takes_boxed(_: Box<dyn Store>) {}
    }
}
