use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A UMLS concept as loaded from the Metathesaurus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub cui: String,
    /// Preferred English name (title).
    pub name: String,
    /// Other English strings for the concept. Never contains `name`.
    pub aliases: BTreeSet<String>,
    /// Semantic type names, in MRSTY order.
    pub semantic_types: Vec<String>,
    pub definition: Option<String>,
}

impl Concept {
    pub fn new(cui: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cui: cui.into(),
            name: name.into(),
            aliases: BTreeSet::new(),
            semantic_types: Vec::new(),
            definition: None,
        }
    }

    /// Surface strings in lookup priority: the preferred name first,
    /// then aliases in sorted order.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
