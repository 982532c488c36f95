use serde::Serialize;

use super::{EntityLinker, LinkError};
use crate::config::RESOLVE_PROGRESS_EVERY;
use crate::models::{Candidate, Concept};

/// Resolver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolverConfig {
    /// Candidates scoring below this are dropped. `0.0` keeps everything.
    pub min_score: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { min_score: 0.0 }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), LinkError> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(LinkError::InvalidSetting(format!(
                "min score must be within [0, 1], got {}",
                self.min_score
            )));
        }
        Ok(())
    }
}

/// All surviving candidates for one concept.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub cui: String,
    pub candidates: Vec<Candidate>,
}

/// Drives an `EntityLinker` over the concept table.
pub struct Resolver<L: EntityLinker> {
    linker: L,
    config: ResolverConfig,
}

impl<L: EntityLinker> Resolver<L> {
    pub fn new(linker: L, config: ResolverConfig) -> Result<Self, LinkError> {
        config.validate()?;
        Ok(Self { linker, config })
    }

    pub fn linker(&self) -> &L {
        &self.linker
    }

    /// Resolve one concept: query the linker, drop low scores and
    /// non-finite values, attach entity titles.
    pub fn resolve(&self, concept: &Concept) -> Result<Resolution, LinkError> {
        let candidates = self
            .linker
            .candidates(concept)?
            .into_iter()
            .filter(|c| c.score.is_finite() && c.score >= self.config.min_score)
            .map(|mut c| {
                c.entity_title = self.linker.entity_title(&c.qid).map(str::to_string);
                c
            })
            .collect();

        Ok(Resolution {
            cui: concept.cui.clone(),
            candidates,
        })
    }

    /// Resolve every concept, in order.
    pub fn resolve_all(&self, concepts: &[Concept]) -> Result<Vec<Resolution>, LinkError> {
        tracing::info!(
            concepts = concepts.len(),
            source = %self.linker.source(),
            "Resolving concepts"
        );

        let mut resolutions = Vec::with_capacity(concepts.len());
        let mut with_candidates = 0usize;
        for (i, concept) in concepts.iter().enumerate() {
            let resolution = self.resolve(concept)?;
            if !resolution.candidates.is_empty() {
                with_candidates += 1;
            }
            resolutions.push(resolution);

            if (i + 1) % RESOLVE_PROGRESS_EVERY == 0 {
                tracing::info!(resolved = i + 1, with_candidates, "Resolving");
            }
        }

        tracing::info!(
            resolved = resolutions.len(),
            with_candidates,
            "Resolution finished"
        );
        Ok(resolutions)
    }
}
