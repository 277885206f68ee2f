use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Both collaborators are trait objects so tests can swap in the
/// in-memory store and a scripted generator.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub llm: Arc<dyn TextGenerator>,
}
