use serde::{Deserialize, Serialize};

/// A WikiData entity as described by the linker's entity database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub qid: String,
    pub title: String,
    pub aliases: Vec<String>,
}

/// One (QID, prior) pair from the alias candidate map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasCandidate {
    pub qid: String,
    pub prior: f64,
}
