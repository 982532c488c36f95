//! The entity database bundled with the pretrained linker.
//!
//! Layout (under `data/entity_db`):
//! - `entity_mappings/alias2qids.json`: `{alias: [[qid, prior], ...]}`
//! - `entity_mappings/qid2title.json`: `{qid: title}`

use std::collections::HashMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::mentions::token_count;
use super::LinkError;
use crate::models::{AliasCandidate, EntityRecord};

pub const ALIAS_CANDIDATES_FILE: &str = "entity_mappings/alias2qids.json";
pub const TITLES_FILE: &str = "entity_mappings/qid2title.json";

/// Alias candidate map plus entity records, held in memory.
#[derive(Debug, Default)]
pub struct EntityDb {
    alias_candidates: HashMap<String, Vec<AliasCandidate>>,
    entities: HashMap<String, EntityRecord>,
    max_alias_tokens: usize,
}

impl EntityDb {
    /// Load both mapping files from an extracted entity database.
    pub fn load(entity_dir: &Path) -> Result<Self, LinkError> {
        if !entity_dir.is_dir() {
            return Err(LinkError::MissingEntityDb(entity_dir.to_path_buf()));
        }

        tracing::info!(dir = %entity_dir.display(), "Loading entity database");
        let raw_candidates: HashMap<String, Vec<(String, f64)>> =
            read_json(&entity_dir.join(ALIAS_CANDIDATES_FILE))?;
        let titles: HashMap<String, String> = read_json(&entity_dir.join(TITLES_FILE))?;

        let db = Self::from_parts(raw_candidates, titles);
        tracing::info!(
            aliases = db.alias_candidates.len(),
            entities = db.entities.len(),
            "Loaded entity database"
        );
        Ok(db)
    }

    /// Build from already-parsed maps.
    pub fn from_parts(
        raw_candidates: HashMap<String, Vec<(String, f64)>>,
        titles: HashMap<String, String>,
    ) -> Self {
        let mut entities: HashMap<String, EntityRecord> = titles
            .into_iter()
            .map(|(qid, title)| {
                let record = EntityRecord {
                    qid: qid.clone(),
                    title,
                    aliases: Vec::new(),
                };
                (qid, record)
            })
            .collect();

        let mut max_alias_tokens = 0;
        let alias_candidates: HashMap<String, Vec<AliasCandidate>> = raw_candidates
            .into_iter()
            .map(|(alias, pairs)| {
                max_alias_tokens = max_alias_tokens.max(token_count(&alias));
                let candidates = pairs
                    .into_iter()
                    .map(|(qid, prior)| {
                        if let Some(entity) = entities.get_mut(&qid) {
                            entity.aliases.push(alias.clone());
                        }
                        AliasCandidate { qid, prior }
                    })
                    .collect();
                (alias, candidates)
            })
            .collect();

        for entity in entities.values_mut() {
            entity.aliases.sort();
        }

        Self {
            alias_candidates,
            entities,
            max_alias_tokens,
        }
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.alias_candidates.contains_key(alias)
    }

    pub fn candidates(&self, alias: &str) -> &[AliasCandidate] {
        self.alias_candidates
            .get(alias)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entity(&self, qid: &str) -> Option<&EntityRecord> {
        self.entities.get(qid)
    }

    pub fn title(&self, qid: &str) -> Option<&str> {
        self.entity(qid).map(|e| e.title.as_str())
    }

    /// Longest alias in tokens; bounds mention extraction.
    pub fn max_alias_tokens(&self) -> usize {
        self.max_alias_tokens
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LinkError> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LinkError::MissingEntityDb(PathBuf::from(path)),
        _ => LinkError::Io(e),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| LinkError::Json {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
