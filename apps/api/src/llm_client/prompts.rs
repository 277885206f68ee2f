// Shared prompt fragments. Each feature module that calls the generator
// keeps its own prompts.rs alongside it; cross-cutting text lives here.

/// Appended to every prompt that feeds training material to the generator.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY the training content provided below. \
    Do NOT introduce facts, policies, or procedures that the content does not state.";
