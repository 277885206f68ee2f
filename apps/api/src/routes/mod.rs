pub mod health;

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;
use crate::{assessment, grading, learning_style, planning};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Quiz API
        .route(
            "/api/v1/quizzes/module",
            post(assessment::handlers::handle_module_quiz),
        )
        .route(
            "/api/v1/quizzes/baseline",
            post(assessment::handlers::handle_baseline_quiz),
        )
        // Grading API
        .route("/api/v1/grading", post(grading::handlers::handle_grade))
        .route(
            "/api/v1/employees/:employee_id/submissions",
            get(grading::handlers::handle_list_submissions),
        )
        // Learning plan API
        .route(
            "/api/v1/learning-plans",
            post(planning::handlers::handle_learning_plan),
        )
        // Learning style API
        .route(
            "/api/v1/learning-styles",
            post(learning_style::handlers::handle_submit_survey),
        )
        .with_state(state)
}

/// Runs `task` on its own tokio task and waits for it.
///
/// If the client disconnects, the handler future is dropped but the spawned
/// task keeps going, so a generated result is still persisted.
pub async fn run_detached<F, T>(task: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(task).await {
        Ok(result) => result,
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Background task failed: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::assessment::generator::fixtures::mcq_quiz_json;
    use crate::llm_client::scripted::ScriptedGenerator;
    use crate::models::assessment::{AssessmentRecord, AssessmentScope, NewAssessment};
    use crate::models::content::ModuleDescriptor;
    use crate::models::question::Question;
    use crate::store::memory::MemoryStore;
    use crate::store::AssessmentStore;

    struct Harness {
        store: Arc<MemoryStore>,
        llm: Arc<ScriptedGenerator>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: Arc::new(MemoryStore::new()),
                llm: Arc::new(ScriptedGenerator::default()),
            }
        }

        fn router(&self) -> Router {
            build_router(AppState {
                store: self.store.clone(),
                llm: self.llm.clone(),
            })
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
                .unwrap();
            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    }

    /// Stores a one-question baseline whose answer is `true`.
    async fn stored_true_false(harness: &Harness, company_id: Uuid) -> AssessmentRecord {
        let questions: Vec<Question> = serde_json::from_value(json!([
            {"type": "true_false", "question": "Exits must stay clear", "correctAnswer": true}
        ]))
        .unwrap();
        harness
            .store
            .insert_assessment(&NewAssessment {
                scope: AssessmentScope::Baseline { company_id },
                training_id: None,
                questions,
                content_fingerprint: None,
            })
            .await
            .unwrap()
            .into_record()
    }

    fn module(title: &str) -> ModuleDescriptor {
        ModuleDescriptor {
            id: Uuid::new_v4(),
            title: Some(title.to_string()),
            summary: Some(format!("{title} basics")),
            topics: vec!["ppe".to_string()],
            objectives: vec![format!("Explain {title}")],
        }
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new();
        let (status, body) = harness.send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_module_quiz_round_trip() {
        let harness = Harness::new();
        let safety = module("Safety");
        let module_id = safety.id;
        harness.store.add_module(Uuid::new_v4(), safety);
        harness.llm.push(mcq_quiz_json(10));

        let request = json!({"moduleId": module_id});
        let (status, first) = harness
            .send("POST", "/api/v1/quizzes/module", Some(request.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["source"], "generated");
        assert_eq!(first["quiz"].as_array().unwrap().len(), 10);

        let (_, second) = harness
            .send("POST", "/api/v1/quizzes/module", Some(request))
            .await;
        assert_eq!(second["source"], "cached");
        assert_eq!(second["quiz"], first["quiz"]);
        assert_eq!(second["assessmentId"], first["assessmentId"]);
        assert_eq!(harness.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_module_variant_is_rejected() {
        let harness = Harness::new();
        let (status, _) = harness
            .send(
                "POST",
                "/api/v1/quizzes/module",
                Some(json!({"moduleId": Uuid::new_v4(), "variant": "kinesthetic"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_baseline_requires_modules() {
        let harness = Harness::new();
        let (status, body) = harness
            .send(
                "POST",
                "/api/v1/quizzes/baseline",
                Some(json!({"companyId": Uuid::new_v4(), "moduleIds": []})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = harness
            .send(
                "POST",
                "/api/v1/quizzes/baseline",
                Some(json!({"companyId": Uuid::new_v4(), "moduleIds": [Uuid::new_v4()]})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generation_failure_is_server_error() {
        let harness = Harness::new();
        let safety = module("Safety");
        let module_id = safety.id;
        harness.store.add_module(Uuid::new_v4(), safety);

        let (status, body) = harness
            .send(
                "POST",
                "/api/v1/quizzes/module",
                Some(json!({"moduleId": module_id})),
            )
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        assert!(harness.store.assessments().is_empty());
    }

    #[tokio::test]
    async fn test_lightweight_grading() {
        let harness = Harness::new();
        harness.llm.push("Nice work.");
        let questions = json!([
            {"type": "mcq", "question": "Q1", "options": ["a", "b"], "correctIndex": 0},
            {"type": "mcq", "question": "Q2", "options": ["a", "b"], "correctIndex": 1}
        ]);

        let (status, body) = harness
            .send(
                "POST",
                "/api/v1/grading",
                Some(json!({"questions": questions, "submittedAnswers": [0, 0]})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 1);
        assert_eq!(body["maxScore"], 2);
        assert_eq!(body["perQuestion"], json!([true, false]));
        assert_eq!(body["feedback"], "Nice work.");
        assert_eq!(body["persisted"], false);
        assert!(body.get("persistenceError").is_none());
    }

    #[tokio::test]
    async fn test_grading_unknown_assessment_is_not_found() {
        let harness = Harness::new();
        let (status, _) = harness
            .send(
                "POST",
                "/api/v1/grading",
                Some(json!({
                    "questions": [{"type": "true_false", "question": "Q", "correctAnswer": true}],
                    "submittedAnswers": [true],
                    "employeeId": Uuid::new_v4(),
                    "assessmentId": Uuid::new_v4()
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(harness.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_graded_submission_feeds_history_and_plan() {
        let harness = Harness::new();
        let company_id = Uuid::new_v4();
        harness.store.add_module(company_id, module("Safety"));
        let assessment = stored_true_false(&harness, company_id).await;
        let employee_id = Uuid::new_v4();
        harness.llm.push("Keep practising.");

        let (status, graded) = harness
            .send(
                "POST",
                "/api/v1/grading",
                Some(json!({
                    "questions": [{"type": "true_false", "question": "Q", "correctAnswer": true}],
                    "submittedAnswers": [true],
                    "employeeId": employee_id,
                    "assessmentId": assessment.id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graded["persisted"], true);

        let (status, history) = harness
            .send(
                "GET",
                &format!("/api/v1/employees/{employee_id}/submissions"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history[0]["assessmentKind"], "baseline");
        assert_eq!(history[0]["score"], 1);

        harness
            .llm
            .push(r#"{"modules": [{"title": "Safety", "recommendedHours": 1}]}"#);
        let (status, plan) = harness
            .send(
                "POST",
                "/api/v1/learning-plans",
                Some(json!({"employeeId": employee_id})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["source"], "generated");
        assert_eq!(plan["plan"]["modules"][0]["title"], "Safety");
    }

    #[tokio::test]
    async fn test_stored_assessment_answer_key_wins() {
        let harness = Harness::new();
        let assessment = stored_true_false(&harness, Uuid::new_v4()).await;
        let employee_id = Uuid::new_v4();
        harness.llm.push("Review the exit rules.");

        let (status, graded) = harness
            .send(
                "POST",
                "/api/v1/grading",
                Some(json!({
                    "questions": [{"type": "true_false", "question": "Q", "correctAnswer": false}],
                    "submittedAnswers": [false],
                    "employeeId": employee_id,
                    "assessmentId": assessment.id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graded["score"], 0);
        assert_eq!(graded["maxScore"], 1);
        assert_eq!(graded["persisted"], true);

        let (_, history) = harness
            .send(
                "GET",
                &format!("/api/v1/employees/{employee_id}/submissions"),
                None,
            )
            .await;
        assert_eq!(history[0]["score"], 0);
    }

    #[tokio::test]
    async fn test_learning_style_submitted_once() {
        let harness = Harness::new();
        let employee_id = Uuid::new_v4();
        harness.llm.push(r#"{"analysis": "Enjoys experiments."}"#);
        let mut answers = vec![2; 40];
        answers[30..].fill(5);
        let request = json!({"employeeId": employee_id, "answers": answers});

        let (status, body) = harness
            .send("POST", "/api/v1/learning-styles", Some(request.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["learningStyle"], "concrete_random");
        assert_eq!(body["analysis"], "Enjoys experiments.");

        let (status, body) = harness
            .send("POST", "/api/v1/learning-styles", Some(request))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
}
