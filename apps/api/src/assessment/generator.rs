//! Quiz Generator Adapter: turns training content into a validated question
//! list through the text generator.
//!
//! Generator output is untrusted. Anything that is not a well-formed question
//! is dropped here, so callers only ever see questions that can be graded.
//! An unusable response is reported as an empty list, never as an error;
//! only transport failures surface as `Err`.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::assessment::prompts::{QUIZ_PROMPT_TEMPLATE, QUIZ_SYSTEM, STYLE_INSTRUCTION_TEMPLATE};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{strip_json_fences, LlmError, TextGenerator};
use crate::models::content::ModuleDescriptor;
use crate::models::learning_style::LearningStyle;
use crate::models::question::{Question, TypedQuestion};

/// Everything the generator is allowed to know about the material.
#[derive(Debug, Clone, Copy)]
pub struct QuizContent<'a> {
    pub summary: &'a str,
    pub descriptors: &'a [ModuleDescriptor],
    pub objectives: &'a [String],
    pub style: Option<LearningStyle>,
}

impl QuizContent<'_> {
    fn render_prompt(&self) -> String {
        let modules: Vec<Value> = self
            .descriptors
            .iter()
            .map(|d| {
                json!({
                    "title": d.title,
                    "topics": d.topics,
                    "objectives": d.objectives,
                })
            })
            .collect();
        let style_instruction = self
            .style
            .map(|style| STYLE_INSTRUCTION_TEMPLATE.replace("{style_hint}", style.style_hint()))
            .unwrap_or_default();

        QUIZ_PROMPT_TEMPLATE
            .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
            .replace("{style_instruction}", &style_instruction)
            .replace("{summary}", self.summary)
            .replace("{modules_json}", &format!("{:#}", Value::Array(modules)))
            .replace("{objectives_json}", &format!("{:#}", json!(self.objectives)))
    }
}

/// Asks the generator for a quiz and returns the questions that survived validation.
pub async fn generate_questions<G>(
    llm: &G,
    content: &QuizContent<'_>,
) -> Result<Vec<Question>, LlmError>
where
    G: TextGenerator + ?Sized,
{
    let prompt = content.render_prompt();
    let text = match llm.complete(&prompt, QUIZ_SYSTEM).await {
        Ok(text) => text,
        Err(LlmError::EmptyContent) => {
            warn!("Quiz generator returned no content");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let questions = parse_questions(&text);
    info!(
        "Quiz generator produced {} usable questions for {} module(s)",
        questions.len(),
        content.descriptors.len()
    );
    Ok(questions)
}

/// Extracts valid questions from raw generator text.
///
/// Accepts a bare array, or an object wrapping the array under `questions`
/// or `quiz`. Code fences are tolerated.
pub fn parse_questions(text: &str) -> Vec<Question> {
    let value: Value = match serde_json::from_str(strip_json_fences(text)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Quiz generator output is not JSON: {e}");
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions").or_else(|| map.remove("quiz")) {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Quiz generator returned an object without a question array");
                return Vec::new();
            }
        },
        _ => {
            warn!("Quiz generator returned neither an array nor an object");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match parse_item(item) {
            Ok(question) => Some(question),
            Err(reason) => {
                warn!("Dropping generated question {index}: {reason}");
                None
            }
        })
        .collect()
}

fn parse_item(mut item: Value) -> Result<Question, String> {
    let fields = item
        .as_object_mut()
        .ok_or_else(|| "not a JSON object".to_string())?;

    if let Some(index) = fields.remove("correct_index") {
        fields.entry("correctIndex").or_insert(index);
    }
    if let Some(Value::String(kind)) = fields.get_mut("type") {
        *kind = kind.trim().to_lowercase();
    }
    // The original quiz shape had no type tag; options plus correctIndex means mcq.
    if !fields.contains_key("type")
        && fields.contains_key("options")
        && fields.contains_key("correctIndex")
    {
        fields.insert("type".to_string(), Value::from("mcq"));
    }

    let typed: TypedQuestion = serde_json::from_value(item).map_err(|e| e.to_string())?;
    typed.validate()?;
    Ok(Question::Known(typed))
}
