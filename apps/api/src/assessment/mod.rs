// Assessment engine: content fingerprinting, quiz generation, and the
// cache controller that decides between reuse, generation, and regeneration.
// All generator calls go through llm_client::TextGenerator.

pub mod cache;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod snapshot;
