//! Mapping assembler: one row per CUI, best candidate wins.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::{Candidate, Concept, MappingRow};
use crate::pipeline::linking::Resolution;

/// Priority order between two candidates for the same concept:
/// higher score, then earlier surface form / mention, then the
/// numerically smaller QID (`Q9` before `Q10`).
pub fn candidate_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.surface_rank.cmp(&b.surface_rank))
        .then(a.qid.len().cmp(&b.qid.len()))
        .then_with(|| a.qid.cmp(&b.qid))
}

/// The winning candidate, if any.
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by(|a, b| candidate_order(a, b))
}

/// Build the mapping table. Row order follows `concepts`; a CUI listed
/// twice keeps its first occurrence only.
pub fn assemble(concepts: &[Concept], resolutions: Vec<Resolution>) -> Vec<MappingRow> {
    let mut by_cui: HashMap<String, Vec<Candidate>> = HashMap::with_capacity(resolutions.len());
    for resolution in resolutions {
        by_cui
            .entry(resolution.cui)
            .or_default()
            .extend(resolution.candidates);
    }

    let mut seen = HashSet::with_capacity(concepts.len());
    let mut rows = Vec::with_capacity(concepts.len());
    for concept in concepts {
        if !seen.insert(concept.cui.as_str()) {
            tracing::warn!(cui = %concept.cui, "Duplicate concept skipped");
            continue;
        }

        let best = by_cui
            .get(&concept.cui)
            .and_then(|candidates| select_best(candidates));
        rows.push(to_row(concept, best));
    }

    let matched = rows.iter().filter(|r| r.is_matched()).count();
    tracing::info!(rows = rows.len(), matched, "Assembled mapping");
    rows
}

fn to_row(concept: &Concept, best: Option<&Candidate>) -> MappingRow {
    MappingRow {
        cui: concept.cui.clone(),
        qid: best.map(|c| c.qid.clone()),
        score: best.map(|c| c.score),
        umls_title: concept.name.clone(),
        umls_types: concept.semantic_types.clone(),
        umls_definition: concept.definition.clone(),
        wikidata_title: best.and_then(|c| c.entity_title.clone()),
        matched_alias: best.map(|c| c.alias.clone()),
        source: best.map(|c| c.source),
    }
}
