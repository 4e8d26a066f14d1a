//! Model catalog for the streaming chat client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A model the client can request, with its output token ceiling.
///
/// Instances are immutable once constructed. The built-in catalog is
/// addressable by index via [`ModelSpec::by_index`]; hosts with their own
/// model lists can construct specs directly with [`ModelSpec::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Provider model identifier sent in the request payload.
    pub name: String,
    /// Value for the payload's `max_tokens` field.
    pub max_output_tokens: u32,
}

/// Built-in model catalog: (name, max output tokens).
const CATALOG: &[(&str, u32)] = &[
    ("claude-sonnet-4-20250514", 64_000),
    ("claude-opus-4-1-20250805", 32_000),
    ("claude-3-5-haiku-20241022", 8_192),
];

impl ModelSpec {
    /// Create a model spec for an arbitrary model identifier.
    pub fn new(name: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            name: name.into(),
            max_output_tokens,
        }
    }

    /// Look up a model from the built-in catalog by index.
    ///
    /// Returns `None` when the index is out of range.
    pub fn by_index(index: usize) -> Option<Self> {
        CATALOG
            .get(index)
            .map(|&(name, max)| ModelSpec::new(name, max))
    }

    /// Number of entries in the built-in catalog.
    pub fn catalog_len() -> usize {
        CATALOG.len()
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::by_index(0).expect("catalog is non-empty")
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
