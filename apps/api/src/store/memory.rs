//! In-memory store with the same uniqueness rules as the Postgres schema.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{
    AssessmentKind, AssessmentRecord, AssessmentScope, AssessmentUpdate, NewAssessment,
};
use crate::models::content::ModuleDescriptor;
use crate::models::learning_style::{LearningStyleRecord, NewLearningStyle};
use crate::models::plan::{LearningPlan, PlanBody, PlanStatus};
use crate::models::submission::{NewSubmission, SubmissionRecord};
use crate::store::{
    AssessmentStore, ContentSource, InsertOutcome, LearningPlanStore, LearningStyleStore,
    SubmissionStore,
};

#[derive(Default)]
struct State {
    modules: Vec<(Uuid, ModuleDescriptor)>,
    assessments: Vec<AssessmentRecord>,
    submissions: Vec<SubmissionRecord>,
    plans: Vec<LearningPlan>,
    styles: Vec<LearningStyleRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&self, company_id: Uuid, descriptor: ModuleDescriptor) {
        self.state
            .lock()
            .unwrap()
            .modules
            .push((company_id, descriptor));
    }

    /// Replaces a module's content in place, as re-ingestion would.
    pub fn replace_module(&self, descriptor: ModuleDescriptor) {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.modules.iter_mut().find(|(_, m)| m.id == descriptor.id) {
            slot.1 = descriptor;
        }
    }

    pub fn assessments(&self) -> Vec<AssessmentRecord> {
        self.state.lock().unwrap().assessments.clone()
    }

    pub fn plans(&self) -> Vec<LearningPlan> {
        self.state.lock().unwrap().plans.clone()
    }

    /// Makes every subsequent write fail with a database error.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for MemoryStore {
    async fn get_module_descriptor(
        &self,
        module_id: Uuid,
    ) -> Result<Option<ModuleDescriptor>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .modules
            .iter()
            .find(|(_, m)| m.id == module_id)
            .map(|(_, m)| m.clone()))
    }

    async fn list_descriptors(
        &self,
        company_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<Vec<ModuleDescriptor>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .modules
            .iter()
            .filter(|(company, m)| *company == company_id && module_ids.contains(&m.id))
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn list_employee_descriptors(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<ModuleDescriptor>, AppError> {
        let state = self.state.lock().unwrap();
        let companies: Vec<Uuid> = state
            .submissions
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .filter_map(|s| state.assessments.iter().find(|a| a.id == s.assessment_id))
            .filter_map(|a| match a.scope {
                AssessmentScope::Baseline { company_id } => Some(company_id),
                AssessmentScope::Module { module_id, .. } => state
                    .modules
                    .iter()
                    .find(|(_, m)| m.id == module_id)
                    .map(|(company, _)| *company),
            })
            .collect();

        Ok(state
            .modules
            .iter()
            .filter(|(company, _)| companies.contains(company))
            .map(|(_, m)| m.clone())
            .collect())
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn find_by_scope(
        &self,
        scope: &AssessmentScope,
    ) -> Result<Option<AssessmentRecord>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .assessments
            .iter()
            .filter(|a| a.scope == *scope)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Option<AssessmentRecord>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.assessments.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_assessment(&self, new: &NewAssessment) -> Result<InsertOutcome, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.assessments.iter().find(|a| a.scope == new.scope) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }

        let now = Utc::now();
        let record = AssessmentRecord {
            id: Uuid::new_v4(),
            scope: new.scope,
            training_id: new.training_id,
            questions: new.questions.clone(),
            content_fingerprint: new.content_fingerprint.clone(),
            created_at: now,
            updated_at: now,
        };
        state.assessments.push(record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn update_assessment(
        &self,
        id: Uuid,
        update: &AssessmentUpdate,
    ) -> Result<AssessmentRecord, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let record = state
            .assessments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;

        record.questions = update.questions.clone();
        record.content_fingerprint = update.content_fingerprint.clone();
        if update.training_id.is_some() {
            record.training_id = update.training_id;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn record_submission(&self, new: &NewSubmission) -> Result<SubmissionRecord, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        if new.assessment_kind == AssessmentKind::Module {
            if let Some(existing) = state.submissions.iter_mut().find(|s| {
                s.assessment_kind == AssessmentKind::Module
                    && s.employee_id == new.employee_id
                    && s.assessment_id == new.assessment_id
            }) {
                existing.answers = new.answers.clone();
                existing.score = new.score;
                existing.max_score = new.max_score;
                existing.feedback = new.feedback.clone();
                existing.question_feedback = new.question_feedback.clone();
                existing.updated_at = now;
                return Ok(existing.clone());
            }
        }

        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            employee_id: new.employee_id,
            assessment_id: new.assessment_id,
            assessment_kind: new.assessment_kind,
            answers: new.answers.clone(),
            score: new.score,
            max_score: new.max_score,
            feedback: new.feedback.clone(),
            question_feedback: new.question_feedback.clone(),
            created_at: now,
            updated_at: now,
        };
        state.submissions.push(record.clone());
        Ok(record)
    }

    async fn list_submissions(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<SubmissionRecord>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .submissions
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LearningPlanStore for MemoryStore {
    async fn find_assigned_plan(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<LearningPlan>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .plans
            .iter()
            .filter(|p| p.employee_id == employee_id && p.status == PlanStatus::Assigned)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn update_plan(
        &self,
        id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let plan = state
            .plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Learning plan {id} not found")))?;

        plan.body = body.clone();
        plan.assessment_hash = assessment_hash.to_string();
        plan.status = PlanStatus::Assigned;
        plan.updated_at = Utc::now();
        Ok(plan.clone())
    }

    async fn insert_assigned_plan(
        &self,
        employee_id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();

        for plan in state
            .plans
            .iter_mut()
            .filter(|p| p.employee_id == employee_id && p.status == PlanStatus::Assigned)
        {
            plan.status = PlanStatus::Superseded;
            plan.updated_at = now;
        }

        let plan = LearningPlan {
            id: Uuid::new_v4(),
            employee_id,
            body: body.clone(),
            status: PlanStatus::Assigned,
            assessment_hash: assessment_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.plans.push(plan.clone());
        Ok(plan)
    }
}

#[async_trait]
impl LearningStyleStore for MemoryStore {
    async fn find_learning_style(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<LearningStyleRecord>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .styles
            .iter()
            .find(|s| s.employee_id == employee_id)
            .cloned())
    }

    async fn insert_learning_style(&self, new: &NewLearningStyle) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if state.styles.iter().any(|s| s.employee_id == new.employee_id) {
            return Ok(false);
        }
        state.styles.push(LearningStyleRecord {
            employee_id: new.employee_id,
            answers: new.answers.clone(),
            learning_style: new.learning_style,
            analysis: new.analysis.clone(),
            created_at: Utc::now(),
        });
        Ok(true)
    }
}
