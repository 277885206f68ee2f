// Learning plan synthesis from an employee's graded assessment history.

pub mod handlers;
pub mod prompts;
pub mod synthesizer;
