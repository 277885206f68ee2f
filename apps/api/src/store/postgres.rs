use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::assessment::{
    AssessmentKind, AssessmentRecord, AssessmentRow, AssessmentScope, AssessmentUpdate, NewAssessment,
};
use crate::models::content::{ModuleDescriptor, TrainingModuleRow};
use crate::models::learning_style::{LearningStyleRecord, LearningStyleRow, NewLearningStyle};
use crate::models::plan::{LearningPlan, LearningPlanRow, PlanBody};
use crate::models::submission::{NewSubmission, SubmissionRecord, SubmissionRow};
use crate::store::{
    AssessmentStore, ContentSource, InsertOutcome, LearningPlanStore, LearningStyleStore,
    SubmissionStore,
};

const MODULE_COLUMNS: &str = "id, title, summary, topics, objectives";

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentSource for PgStore {
    async fn get_module_descriptor(
        &self,
        module_id: Uuid,
    ) -> Result<Option<ModuleDescriptor>, AppError> {
        let row = sqlx::query_as::<_, TrainingModuleRow>(&format!(
            "SELECT {MODULE_COLUMNS} FROM training_modules WHERE id = $1"
        ))
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ModuleDescriptor::from))
    }

    async fn list_descriptors(
        &self,
        company_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<Vec<ModuleDescriptor>, AppError> {
        let rows = sqlx::query_as::<_, TrainingModuleRow>(&format!(
            "SELECT {MODULE_COLUMNS} FROM training_modules \
             WHERE company_id = $1 AND id = ANY($2) \
             ORDER BY order_index, id"
        ))
        .bind(company_id)
        .bind(module_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModuleDescriptor::from).collect())
    }

    async fn list_employee_descriptors(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<ModuleDescriptor>, AppError> {
        let rows = sqlx::query_as::<_, TrainingModuleRow>(&format!(
            r#"
            SELECT {MODULE_COLUMNS} FROM training_modules
            WHERE company_id IN (
                SELECT COALESCE(a.company_id, m.company_id)
                FROM employee_assessments s
                JOIN assessments a ON a.id = s.assessment_id
                LEFT JOIN training_modules m ON m.id = a.module_id
                WHERE s.employee_id = $1
            )
            ORDER BY order_index, id
            "#
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModuleDescriptor::from).collect())
    }
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn find_by_scope(
        &self,
        scope: &AssessmentScope,
    ) -> Result<Option<AssessmentRecord>, AppError> {
        let row = match scope {
            AssessmentScope::Baseline { company_id } => {
                sqlx::query_as::<_, AssessmentRow>(
                    r#"
                    SELECT * FROM assessments
                    WHERE kind = 'baseline' AND company_id = $1
                    ORDER BY created_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(company_id)
                .fetch_optional(&self.pool)
                .await?
            }
            AssessmentScope::Module { module_id, variant } => {
                sqlx::query_as::<_, AssessmentRow>(
                    r#"
                    SELECT * FROM assessments
                    WHERE kind = 'module' AND module_id = $1 AND variant = $2
                    ORDER BY created_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(module_id)
                .bind(variant.as_key())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row.map(AssessmentRecord::try_from).transpose()?)
    }

    async fn get_assessment(&self, id: Uuid) -> Result<Option<AssessmentRecord>, AppError> {
        let row = sqlx::query_as::<_, AssessmentRow>("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AssessmentRecord::try_from).transpose()?)
    }

    async fn insert_assessment(&self, new: &NewAssessment) -> Result<InsertOutcome, AppError> {
        let (company_id, module_id, variant, conflict_target) = match new.scope {
            AssessmentScope::Baseline { company_id } => (
                Some(company_id),
                None,
                None,
                "(company_id) WHERE kind = 'baseline'",
            ),
            AssessmentScope::Module { module_id, variant } => (
                None,
                Some(module_id),
                Some(variant.as_key()),
                "(module_id, variant) WHERE kind = 'module'",
            ),
        };

        let sql = format!(
            r#"
            INSERT INTO assessments
                (id, kind, company_id, module_id, variant, training_id, questions, content_fingerprint)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT {conflict_target} DO NOTHING
            RETURNING *
            "#
        );

        let inserted = sqlx::query_as::<_, AssessmentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.scope.kind().as_str())
            .bind(company_id)
            .bind(module_id)
            .bind(variant)
            .bind(new.training_id)
            .bind(Json(&new.questions))
            .bind(new.content_fingerprint.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = inserted {
            let record = AssessmentRecord::try_from(row)?;
            info!("Inserted assessment {} for {}", record.id, new.scope);
            return Ok(InsertOutcome::Inserted(record));
        }

        debug!("Insert for {} hit the uniqueness constraint", new.scope);
        let existing = self.find_by_scope(&new.scope).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Assessment insert for {} conflicted but no row is visible",
                new.scope
            ))
        })?;
        Ok(InsertOutcome::Existing(existing))
    }

    async fn update_assessment(
        &self,
        id: Uuid,
        update: &AssessmentUpdate,
    ) -> Result<AssessmentRecord, AppError> {
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            UPDATE assessments
            SET questions = $2,
                content_fingerprint = $3,
                training_id = COALESCE($4, training_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&update.questions))
        .bind(update.content_fingerprint.as_deref())
        .bind(update.training_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;

        Ok(AssessmentRecord::try_from(row)?)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn record_submission(&self, new: &NewSubmission) -> Result<SubmissionRecord, AppError> {
        let sql = match new.assessment_kind {
            // Baseline attempts are kept: every retake is a new row.
            AssessmentKind::Baseline => {
                r#"
                INSERT INTO employee_assessments
                    (id, employee_id, assessment_id, assessment_kind, answers,
                     score, max_score, feedback, question_feedback)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
                "#
            }
            AssessmentKind::Module => {
                r#"
                INSERT INTO employee_assessments
                    (id, employee_id, assessment_id, assessment_kind, answers,
                     score, max_score, feedback, question_feedback)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (employee_id, assessment_id) WHERE assessment_kind = 'module'
                DO UPDATE SET
                    answers = EXCLUDED.answers,
                    score = EXCLUDED.score,
                    max_score = EXCLUDED.max_score,
                    feedback = EXCLUDED.feedback,
                    question_feedback = EXCLUDED.question_feedback,
                    updated_at = NOW()
                RETURNING *
                "#
            }
        };

        let row = sqlx::query_as::<_, SubmissionRow>(sql)
            .bind(Uuid::new_v4())
            .bind(new.employee_id)
            .bind(new.assessment_id)
            .bind(new.assessment_kind.as_str())
            .bind(&new.answers)
            .bind(new.score)
            .bind(new.max_score)
            .bind(&new.feedback)
            .bind(Json(&new.question_feedback))
            .fetch_one(&self.pool)
            .await?;

        info!(
            "Recorded {} submission for employee {} on assessment {}",
            new.assessment_kind, new.employee_id, new.assessment_id
        );
        Ok(SubmissionRecord::try_from(row)?)
    }

    async fn list_submissions(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<SubmissionRecord>, AppError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT s.id, s.employee_id, s.assessment_id, a.kind AS assessment_kind,
                   s.answers, s.score, s.max_score, s.feedback, s.question_feedback,
                   s.created_at, s.updated_at
            FROM employee_assessments s
            JOIN assessments a ON a.id = s.assessment_id
            WHERE s.employee_id = $1
            ORDER BY s.created_at, s.id
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(SubmissionRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

#[async_trait]
impl LearningPlanStore for PgStore {
    async fn find_assigned_plan(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<LearningPlan>, AppError> {
        let row = sqlx::query_as::<_, LearningPlanRow>(
            r#"
            SELECT * FROM learning_plans
            WHERE employee_id = $1 AND status = 'assigned'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LearningPlan::try_from).transpose()?)
    }

    async fn update_plan(
        &self,
        id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError> {
        let row = sqlx::query_as::<_, LearningPlanRow>(
            r#"
            UPDATE learning_plans
            SET plan = $2, assessment_hash = $3, status = 'assigned', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(body))
        .bind(assessment_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Learning plan {id} not found")))?;

        Ok(LearningPlan::try_from(row)?)
    }

    async fn insert_assigned_plan(
        &self,
        employee_id: Uuid,
        body: &PlanBody,
        assessment_hash: &str,
    ) -> Result<LearningPlan, AppError> {
        let mut tx = self.pool.begin().await?;

        let superseded = sqlx::query(
            r#"
            UPDATE learning_plans
            SET status = 'superseded', updated_at = NOW()
            WHERE employee_id = $1 AND status = 'assigned'
            "#,
        )
        .bind(employee_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let row = sqlx::query_as::<_, LearningPlanRow>(
            r#"
            INSERT INTO learning_plans (id, employee_id, plan, status, assessment_hash)
            VALUES ($1, $2, $3, 'assigned', $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(Json(body))
        .bind(assessment_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if superseded > 0 {
            info!("Superseded {superseded} assigned plan(s) for employee {employee_id}");
        }
        Ok(LearningPlan::try_from(row)?)
    }
}

#[async_trait]
impl LearningStyleStore for PgStore {
    async fn find_learning_style(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<LearningStyleRecord>, AppError> {
        let row = sqlx::query_as::<_, LearningStyleRow>(
            "SELECT * FROM employee_learning_styles WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LearningStyleRecord::try_from).transpose()?)
    }

    async fn insert_learning_style(&self, new: &NewLearningStyle) -> Result<bool, AppError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO employee_learning_styles (employee_id, answers, learning_style, analysis)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (employee_id) DO NOTHING
            "#,
        )
        .bind(new.employee_id)
        .bind(Json(&new.answers))
        .bind(new.learning_style.as_str())
        .bind(new.analysis.as_deref())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }
}
