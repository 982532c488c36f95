use super::entity_db::EntityDb;
use super::mentions::{extract_mentions, normalize_alias, token_count};
use super::{EntityLinker, LinkError};
use crate::models::{AliasCandidate, Candidate, Concept, MatchKind, MatchSource};

/// Resolves concepts through the entity database's alias priors.
///
/// A whole-string alias hit scores each QID by its share of the alias's
/// prior mass. Otherwise mentions inside the string are looked up and the
/// share is scaled by how much of the string the mention covers.
pub struct AliasPriorLinker {
    db: EntityDb,
    max_mention_len: usize,
}

impl AliasPriorLinker {
    pub fn new(db: EntityDb, max_mention_len: usize) -> Self {
        Self {
            db,
            max_mention_len,
        }
    }

    pub fn entity_db(&self) -> &EntityDb {
        &self.db
    }

    fn push_alias(
        &self,
        out: &mut Vec<Candidate>,
        concept: &Concept,
        alias: &str,
        surface_rank: usize,
        kind: MatchKind,
        coverage: f64,
    ) {
        for (qid, share) in prior_shares(self.db.candidates(alias)) {
            out.push(Candidate {
                cui: concept.cui.clone(),
                qid: qid.to_string(),
                score: share * coverage,
                surface_rank,
                alias: alias.to_string(),
                kind,
                source: MatchSource::AliasPrior,
                entity_title: None,
            });
        }
    }
}

/// Each candidate's fraction of the alias's total prior. Non-positive
/// totals fall back to a uniform split.
fn prior_shares(candidates: &[AliasCandidate]) -> impl Iterator<Item = (&str, f64)> {
    let mass: f64 = candidates
        .iter()
        .map(|c| c.prior)
        .filter(|p| p.is_finite() && *p > 0.0)
        .sum();
    let uniform = 1.0 / candidates.len().max(1) as f64;

    candidates.iter().map(move |c| {
        let share = if mass > 0.0 {
            if c.prior.is_finite() && c.prior > 0.0 {
                c.prior / mass
            } else {
                0.0
            }
        } else {
            uniform
        };
        (c.qid.as_str(), share)
    })
}

impl EntityLinker for AliasPriorLinker {
    fn source(&self) -> MatchSource {
        MatchSource::AliasPrior
    }

    fn candidates(&self, concept: &Concept) -> Result<Vec<Candidate>, LinkError> {
        let mut out = Vec::new();
        let max_len = self.max_mention_len.min(self.db.max_alias_tokens());

        for (rank, surface) in concept.surface_forms().enumerate() {
            let normalized = normalize_alias(surface);
            if normalized.is_empty() {
                continue;
            }

            if self.db.has_alias(&normalized) {
                self.push_alias(&mut out, concept, &normalized, rank, MatchKind::Exact, 1.0);
                continue;
            }

            let total = token_count(&normalized) as f64;
            for mention in extract_mentions(&normalized, max_len, |a| self.db.has_alias(a)) {
                let coverage = mention.token_len() as f64 / total;
                self.push_alias(&mut out, concept, &mention.alias, rank, MatchKind::Mention, coverage);
            }
        }

        Ok(out)
    }

    fn entity_title(&self, qid: &str) -> Option<&str> {
        self.db.title(qid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::linking::entity_db::test_fixtures::write_entity_db;

    fn linker() -> AliasPriorLinker {
        let dir = tempfile::tempdir().unwrap();
        write_entity_db(dir.path());
        AliasPriorLinker::new(EntityDb::load(dir.path()).unwrap(), 5)
    }

    fn best(candidates: &[Candidate]) -> &Candidate {
        candidates
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .unwrap()
    }

    #[test]
    fn exact_alias_scored_by_prior_share() {
        let linker = linker();
        let concept = Concept::new("C1", "Aspirin");

        let candidates = linker.candidates(&concept).unwrap();
        assert_eq!(candidates.len(), 2);
        let top = best(&candidates);
        assert_eq!(top.qid, "Q18216");
        assert!((top.score - 0.9).abs() < 1e-9);
        assert_eq!(top.kind, MatchKind::Exact);
        assert_eq!(top.surface_rank, 0);
        assert_eq!(top.alias, "aspirin");
    }

    #[test]
    fn mention_scores_scaled_by_coverage() {
        let linker = linker();
        let concept = Concept::new("C2", "Congestive heart failure");

        let candidates = linker.candidates(&concept).unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.qid, "Q181754");
        assert_eq!(c.kind, MatchKind::Mention);
        assert!((c.score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn aliases_searched_after_name() {
        let linker = linker();
        let mut concept = Concept::new("C3", "Salicylate compound XYZ");
        concept.aliases.insert("Acetylsalicylic acid".into());

        let candidates = linker.candidates(&concept).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].qid, "Q18216");
        assert_eq!(candidates[0].surface_rank, 1);
        assert!((candidates[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_strings_yield_nothing() {
        let linker = linker();
        let concept = Concept::new("C4", "Zzyzx syndrome");
        assert!(linker.candidates(&concept).unwrap().is_empty());
    }

    #[test]
    fn punctuation_only_name_skipped() {
        let linker = linker();
        let concept = Concept::new("C5", "[-]");
        assert!(linker.candidates(&concept).unwrap().is_empty());
    }

    #[test]
    fn zero_prior_mass_splits_uniformly() {
        let candidates = vec![
            AliasCandidate {
                qid: "Q1".into(),
                prior: 0.0,
            },
            AliasCandidate {
                qid: "Q2".into(),
                prior: 0.0,
            },
        ];
        let shares: Vec<(&str, f64)> = prior_shares(&candidates).collect();
        assert_eq!(shares, vec![("Q1", 0.5), ("Q2", 0.5)]);
    }

    #[test]
    fn titles_come_from_entity_db() {
        let linker = linker();
        assert_eq!(linker.entity_title("Q1072"), Some("heart"));
        assert_eq!(linker.entity_title("Q0"), None);
    }
}
