//! Coaching feedback and submission recording for a graded answer sheet.

use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::grading::engine::GradeReport;
use crate::grading::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::models::assessment::AssessmentRecord;
use crate::models::question::{Question, SubmittedAnswer};
use crate::models::submission::{NewSubmission, SubmissionRecord};
use crate::store::SubmissionStore;

/// Asks the generator for a short coaching summary.
/// Falls back to a fixed message; never fails.
pub async fn summary_feedback<G>(
    llm: &G,
    questions: &[Question],
    answers: &[Option<SubmittedAnswer>],
    report: &GradeReport,
) -> String
where
    G: TextGenerator + ?Sized,
{
    let results: Vec<Value> = questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            json!({
                "question": question.text(),
                "type": question.type_name(),
                "submittedAnswer": answers.get(i).cloned().flatten(),
                "correct": report.per_question.get(i).copied().unwrap_or(false),
                "explanation": report.explanations.get(i),
            })
        })
        .collect();

    let prompt = FEEDBACK_PROMPT_TEMPLATE
        .replace("{score}", &report.score.to_string())
        .replace("{max_score}", &report.max_score.to_string())
        .replace("{results_json}", &format!("{:#}", Value::Array(results)));

    match llm.complete(&prompt, FEEDBACK_SYSTEM).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => fallback_feedback(report),
        Err(e) => {
            warn!("Feedback generation failed, using fallback: {e}");
            fallback_feedback(report)
        }
    }
}

fn fallback_feedback(report: &GradeReport) -> String {
    format!(
        "You answered {} of {} questions correctly. Review the explanations for the questions \
         you missed and revisit those topics in your training modules.",
        report.score, report.max_score
    )
}

/// Stores the graded attempt. Module attempts replace the employee's previous
/// attempt at the same assessment; baseline attempts are appended.
pub async fn record_submission<S>(
    store: &S,
    employee_id: Uuid,
    assessment: &AssessmentRecord,
    answers: &[Option<SubmittedAnswer>],
    report: &GradeReport,
    feedback: &str,
) -> Result<SubmissionRecord, AppError>
where
    S: SubmissionStore + ?Sized,
{
    let new = NewSubmission {
        employee_id,
        assessment_id: assessment.id,
        assessment_kind: assessment.kind(),
        answers: json!(answers),
        score: report.score as i32,
        max_score: report.max_score as i32,
        feedback: feedback.to_string(),
        question_feedback: report.explanations.clone(),
    };

    let record = store.record_submission(&new).await?;
    info!(
        "Recorded {} submission {} for employee {employee_id}: {}/{}",
        record.assessment_kind, record.id, record.score, record.max_score
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedGenerator;
    use crate::llm_client::LlmError;
    use crate::models::assessment::{AssessmentScope, NewAssessment, QuizVariant};
    use crate::store::memory::MemoryStore;
    use crate::store::AssessmentStore;

    fn report() -> GradeReport {
        GradeReport {
            score: 1,
            max_score: 2,
            per_question: vec![true, false],
            explanations: vec!["Correct".to_string(), "Incorrect".to_string()],
        }
    }

    async fn stored_assessment(store: &MemoryStore, scope: AssessmentScope) -> AssessmentRecord {
        store
            .insert_assessment(&NewAssessment {
                scope,
                training_id: None,
                questions: vec![],
                content_fingerprint: None,
            })
            .await
            .unwrap()
            .into_record()
    }

    #[tokio::test]
    async fn test_feedback_uses_generator_text() {
        let llm = ScriptedGenerator::new(["  Great work on fire safety.  "]);
        let feedback = summary_feedback(&llm, &[], &[], &report()).await;
        assert_eq!(feedback, "Great work on fire safety.");
        assert!(llm.prompts()[0].contains("Score: 1 / 2"));
    }

    #[tokio::test]
    async fn test_feedback_falls_back_on_failure() {
        let llm = ScriptedGenerator::default();
        llm.push_error(LlmError::Timeout(90));
        let feedback = summary_feedback(&llm, &[], &[], &report()).await;
        assert!(feedback.starts_with("You answered 1 of 2 questions correctly."));
    }

    #[tokio::test]
    async fn test_module_resubmission_replaces_previous_attempt() {
        let store = MemoryStore::new();
        let employee_id = Uuid::new_v4();
        let assessment = stored_assessment(
            &store,
            AssessmentScope::Module {
                module_id: Uuid::new_v4(),
                variant: QuizVariant::default(),
            },
        )
        .await;

        let first = record_submission(&store, employee_id, &assessment, &[], &report(), "ok")
            .await
            .unwrap();
        let better = GradeReport {
            score: 2,
            ..report()
        };
        let second = record_submission(&store, employee_id, &assessment, &[], &better, "great")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let history = store.list_submissions(employee_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 2);
        assert_eq!(history[0].feedback, "great");
    }

    #[tokio::test]
    async fn test_baseline_submissions_are_appended() {
        let store = MemoryStore::new();
        let employee_id = Uuid::new_v4();
        let assessment = stored_assessment(
            &store,
            AssessmentScope::Baseline {
                company_id: Uuid::new_v4(),
            },
        )
        .await;

        for _ in 0..2 {
            record_submission(&store, employee_id, &assessment, &[], &report(), "ok")
                .await
                .unwrap();
        }
        assert_eq!(store.list_submissions(employee_id).await.unwrap().len(), 2);
    }
}
