//! Entity resolution: UMLS concepts → candidate WikiData entities.
//!
//! Disambiguation belongs to the external pretrained linker. This module
//! only feeds it surface strings and normalizes what comes back into
//! `Candidate` values.

pub mod alias_prior;
pub mod entity_db;
pub mod labels;
pub mod mentions;
pub mod resolver;

use std::path::PathBuf;

use thiserror::Error;

pub use alias_prior::AliasPriorLinker;
pub use entity_db::EntityDb;
pub use labels::LabelLinker;
pub use resolver::{Resolution, Resolver, ResolverConfig};

use crate::models::{Candidate, Concept, MatchSource};

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Entity database not found: {0} (run `cui2qid setup` first)")]
    MissingEntityDb(PathBuf),

    #[error("Linker label file not found: {0}")]
    MissingLabels(PathBuf),

    #[error("Invalid JSON in {path}: {reason}")]
    Json { path: PathBuf, reason: String },

    #[error("Malformed label at {path} line {line}: {reason}")]
    MalformedLabel {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid resolver setting: {0}")]
    InvalidSetting(String),
}

impl LinkError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingEntityDb(_) | Self::MissingLabels(_) | Self::InvalidSetting(_)
        )
    }
}

/// Seam to the external entity linker.
pub trait EntityLinker {
    fn source(&self) -> MatchSource;

    /// Every candidate entity for one concept, unfiltered and unordered.
    fn candidates(&self, concept: &Concept) -> Result<Vec<Candidate>, LinkError>;

    /// Canonical WikiData label, when the linker knows it.
    fn entity_title(&self, qid: &str) -> Option<&str>;
}

impl EntityLinker for Box<dyn EntityLinker> {
    fn source(&self) -> MatchSource {
        (**self).source()
    }

    fn candidates(&self, concept: &Concept) -> Result<Vec<Candidate>, LinkError> {
        (**self).candidates(concept)
    }

    fn entity_title(&self, qid: &str) -> Option<&str> {
        (**self).entity_title(qid)
    }
}
