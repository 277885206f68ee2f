// Prompt constants for rubric grading and coaching feedback.

/// System prompt for rubric grading: enforces JSON-only output.
pub const RUBRIC_SYSTEM: &str = "You are a fair, consistent grader of workplace training \
    assessments. You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Rubric grading prompt template. Replace: {question_count}, {items_json}
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"Grade each of the {question_count} answers below against its question.

Each item carries the question exactly as stored (including any rubric, scenario, accepted answers, or answer key) and the employee's submitted answer (null when unanswered).

A question is either fully correct or incorrect; there is no partial credit. Judge open-ended and scenario answers on whether they show the understanding the rubric asks for, not on wording. For fill-in-the-blank, accept answers equivalent in meaning to an accepted answer.

Return a JSON object with this EXACT schema:
{
  "perQuestion": [true, false],
  "score": 1,
  "maxScore": 2,
  "explanations": ["Why answer 1 is right.", "Why answer 2 is wrong and what the right answer is."]
}

"perQuestion" and "explanations" MUST have exactly {question_count} entries, in item order.

ITEMS:
{items_json}"#;

/// System prompt for coaching feedback. Plain text, not JSON.
pub const FEEDBACK_SYSTEM: &str = "You are an AI learning coach for new employees. \
    Write in a friendly, supportive tone. Respond with plain text only, no markdown headings.";

/// Coaching feedback prompt template. Replace: {score}, {max_score}, {results_json}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Given the following assessment results, provide concise, actionable feedback for the employee. Highlight strengths, weak areas, and suggest next steps for improvement. Keep it under 150 words.

Score: {score} / {max_score}

Results per question:
{results_json}"#;
