use serde::{Deserialize, Serialize};

use super::enums::{MatchKind, MatchSource};

/// A (CUI, QID, score) triple produced while resolving one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub cui: String,
    pub qid: String,
    pub score: f64,
    /// Lookup priority within the concept; lower wins ties.
    /// Surface-form index for alias lookups, mention index for linker labels.
    pub surface_rank: usize,
    /// Alias string that produced the candidate.
    pub alias: String,
    pub kind: MatchKind,
    pub source: MatchSource,
    /// WikiData label of `qid`, filled in by the resolver.
    pub entity_title: Option<String>,
}

/// One output row. Exactly one per CUI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    pub cui: String,
    pub qid: Option<String>,
    pub score: Option<f64>,
    pub umls_title: String,
    pub umls_types: Vec<String>,
    pub umls_definition: Option<String>,
    pub wikidata_title: Option<String>,
    pub matched_alias: Option<String>,
    pub source: Option<MatchSource>,
}

impl MappingRow {
    pub fn is_matched(&self) -> bool {
        self.qid.is_some()
    }
}
