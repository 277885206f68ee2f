// Grading: local comparison for closed-form questions, rubric delegation
// through the generator for everything else, then coaching feedback and
// submission recording.

pub mod engine;
pub mod feedback;
pub mod handlers;
pub mod prompts;
pub mod rubric;
