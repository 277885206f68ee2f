// Prompt constants for quiz generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for quiz generation: enforces JSON-only output.
pub const QUIZ_SYSTEM: &str = "You are an expert instructional designer writing \
    assessment questions for employee onboarding. \
    You MUST respond with valid JSON only: a JSON array of question objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Quiz generation prompt template.
/// Replace: {grounding_instruction}, {style_instruction}, {summary},
///          {modules_json}, {objectives_json}
pub const QUIZ_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Given the training content summary, modules, and objectives below, generate a quiz of 10-12 questions that together cover a range of the topics.

Most questions should be multiple choice with 4 options and exactly one correct answer. You may also use these shapes where the content suits them:

{"type": "mcq", "question": "...", "options": ["a", "b", "c", "d"], "correctIndex": 0, "explanation": "..."}
{"type": "true_false", "question": "...", "correctAnswer": true, "explanation": "..."}
{"type": "multiple_select", "question": "...", "options": ["a", "b", "c", "d"], "correctIndices": [0, 2]}
{"type": "matching", "question": "...", "options": {"Category": ["candidate 1", "candidate 2"]}, "correctMatches": {"Category": "candidate 1"}}
{"type": "ordering", "question": "...", "items": ["step b", "step a"], "correctOrder": ["step a", "step b"]}
{"type": "fill_in_blank", "question": "... ____ ...", "acceptedAnswers": ["answer"]}
{"type": "open_ended", "question": "...", "rubric": "what a complete answer covers"}
{"type": "scenario", "question": "...", "scenario": "short situation", "rubric": "what a good response does"}

Indices are zero-based. "explanation" is optional on every question.
{style_instruction}
SUMMARY:
{summary}

MODULES:
{modules_json}

OBJECTIVES:
{objectives_json}"#;

/// Inserted when the quiz targets a learning style. Replace `{style_hint}`.
pub const STYLE_INSTRUCTION_TEMPLATE: &str =
    "\nLEARNER STYLE: {style_hint}\nShape question wording and scenarios to suit it.\n";
