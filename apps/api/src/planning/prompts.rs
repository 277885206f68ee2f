// Prompt constants for learning plan synthesis.

/// System prompt for plan synthesis: enforces JSON-only output.
pub const PLAN_SYSTEM: &str = "You are an expert corporate trainer and instructional designer. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Plan synthesis prompt template.
/// Replace: {grounding_instruction}, {history_json}, {modules_json}
pub const PLAN_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Given the following assessment results and feedback for an employee, and the available training modules, generate a personalized learning plan. The plan should:
- Identify weak areas based on scores and feedback
- Match module objectives to those weaknesses
- Specify what to study, in what order, and how much time for each
- Include any tips or recommendations

Return a JSON object with this EXACT schema:
{
  "modules": [
    {
      "title": "Module title exactly as listed below",
      "objectives": ["objective to focus on"],
      "recommendedHours": 2.5,
      "tips": ["short, specific tip"]
    }
  ],
  "tips": ["general study tip"],
  "summary": "one or two sentences on the overall focus"
}

List "modules" in the order they should be studied. Only use modules from the list below.

ASSESSMENT RESULTS:
{history_json}

AVAILABLE MODULES:
{modules_json}"#;
