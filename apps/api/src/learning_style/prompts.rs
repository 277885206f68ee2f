// Prompt constants for learning-style analysis.

/// System prompt for learning-style analysis: enforces JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an expert learning style analyst. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Analysis prompt template. Replace: {style_name}, {style_hint}, {responses}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"An employee answered the 40-item learning style survey below on a 1-5 scale (1 = strongly disagree, 5 = strongly agree). Their scores classify them as {style_name}.

STYLE PROFILE:
{style_hint}

Write a short analysis that explains how the responses support this classification and describes how this person learns best during onboarding.

Return a JSON object with this EXACT schema:
{"analysis": "..."}

SURVEY RESPONSES:
{responses}"#;

/// Survey statements, in order. Items 1-10 measure concrete sequential,
/// 11-20 abstract sequential, 21-30 abstract random, 31-40 concrete random.
pub const SURVEY_ITEMS: [&str; 40] = [
    "I like written directions before I start a task.",
    "I would rather follow a schedule than improvise.",
    "I am most comfortable when the rules are clear.",
    "I look at the details before the big picture.",
    "I rely on proven methods to get things done.",
    "I finish one task before moving on to the next.",
    "I learn best by practising exact procedures.",
    "Structure, order and neatness put me at ease.",
    "I like checklists and measurable steps.",
    "Open-ended tasks make me uneasy.",
    "I read and research before making decisions.",
    "I break problems down into smaller parts.",
    "I prefer arguments backed by evidence.",
    "I think a situation through logically before acting.",
    "I enjoy analysing patterns, models and systems.",
    "I reflect carefully before sharing my opinion.",
    "I value accuracy and logical consistency.",
    "I prefer principles and theory to practical examples.",
    "I enjoy well-reasoned debate.",
    "I like working alone on complex problems.",
    "I learn best through stories and real experiences.",
    "Learning motivates me when it connects to people's lives.",
    "I prefer group projects and shared discussion.",
    "I often trust my intuition over data.",
    "I enjoy free-flowing brainstorming.",
    "I easily sense how others in a group feel.",
    "Relationships matter more to me than rigid rules.",
    "I use my imagination to explore new ideas.",
    "I prefer flexible plans that leave room for change.",
    "I need an emotional connection to stay interested.",
    "I try new methods even if they might fail.",
    "I solve problems in unconventional ways.",
    "I learn by experimenting and adjusting as I go.",
    "Strict rules that limit creativity frustrate me.",
    "Competition and challenge energise me.",
    "I take risks when the reward could be high.",
    "Repeating the same task bores me.",
    "I like the freedom to try several approaches.",
    "I often act quickly and work things out later.",
    "I am comfortable deciding with limited information.",
];
