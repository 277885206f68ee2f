//! Content Snapshot Normalizer: order- and whitespace-independent fingerprints
//! of a set of module descriptors. Pure; no I/O.

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::models::content::ModuleDescriptor;

/// Deterministic serialization of a descriptor set.
/// Equal content yields equal forms regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm {
    json: String,
}

impl CanonicalForm {
    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// Hex SHA-256 of the canonical JSON. This is what gets persisted.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.as_str().as_bytes()))
    }
}

// Field order matters: derived Ord sorts by title first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CanonicalModule {
    title: String,
    topics: Vec<String>,
    objectives: Vec<String>,
}

impl CanonicalModule {
    fn to_value(&self) -> Value {
        json!({
            "title": self.title,
            "topics": self.topics,
            "objectives": self.objectives,
        })
    }
}

/// Canonicalizes descriptors: drops entries without a title, collapses
/// whitespace, sorts topics and objectives, then sorts modules by title.
/// Identity and summary are not content and are left out.
pub fn normalize(descriptors: &[ModuleDescriptor]) -> CanonicalForm {
    let mut modules: Vec<CanonicalModule> = descriptors
        .iter()
        .filter_map(|descriptor| {
            let title = collapse_whitespace(descriptor.title.as_deref()?);
            if title.is_empty() {
                return None;
            }
            Some(CanonicalModule {
                title,
                topics: sorted_clean(&descriptor.topics),
                objectives: sorted_clean(&descriptor.objectives),
            })
        })
        .collect();
    modules.sort();

    let value = Value::Array(modules.iter().map(CanonicalModule::to_value).collect());
    CanonicalForm {
        json: value.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sorted_clean(items: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = items
        .iter()
        .map(|item| collapse_whitespace(item))
        .filter(|item| !item.is_empty())
        .collect();
    cleaned.sort();
    cleaned
}
