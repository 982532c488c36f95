use std::collections::HashMap;
use std::path::Path;

use super::rrf;
use super::LoadError;
use crate::config::VALID_VOCABULARIES;
use crate::models::Concept;

pub const MRCONSO: &str = "MRCONSO.RRF";

const CUI: usize = 0;
const LAT: usize = 1;
const TS: usize = 2;
const STT: usize = 4;
const SAB: usize = 11;
const STR: usize = 14;
const MIN_FIELDS: usize = STR + 1;

/// Accumulates concepts in first-appearance order.
#[derive(Default)]
pub struct ConceptTableBuilder {
    concepts: Vec<Concept>,
    /// Whether the stored title came from a preferred-form row.
    preferred: Vec<bool>,
    index: HashMap<String, usize>,
}

impl ConceptTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one MRCONSO record. Non-English rows and rows outside the
    /// valid vocabularies are ignored.
    pub fn push_record(&mut self, fields: &[&str]) {
        if fields[LAT] != "ENG" || !VALID_VOCABULARIES.contains(&fields[SAB]) {
            return;
        }

        let cui = fields[CUI];
        let text = fields[STR];
        let is_preferred = fields[TS] == "P" && fields[STT] == "PF";

        match self.index.get(cui) {
            None => {
                self.index.insert(cui.to_string(), self.concepts.len());
                self.concepts.push(Concept::new(cui, text));
                self.preferred.push(is_preferred);
            }
            Some(&i) => {
                let concept = &mut self.concepts[i];
                // Until a preferred form is stored, each later string takes over the title.
                if !self.preferred[i] && concept.name != text {
                    let previous = std::mem::replace(&mut concept.name, text.to_string());
                    concept.aliases.insert(previous);
                    concept.aliases.remove(text);
                    self.preferred[i] = is_preferred;
                } else {
                    if !self.preferred[i] {
                        self.preferred[i] = is_preferred;
                    }
                    if concept.name != text {
                        concept.aliases.insert(text.to_string());
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn finish(self) -> Vec<Concept> {
        self.concepts
    }
}

/// Load English concepts and their strings from every MRCONSO part.
pub fn load_concepts(meta_dir: &Path) -> Result<Vec<Concept>, LoadError> {
    tracing::info!("Loading concepts from UMLS");

    let parts = rrf::required_table(meta_dir, MRCONSO)?;
    let mut builder = ConceptTableBuilder::new();
    rrf::for_each_record(&parts, MIN_FIELDS, |fields| {
        builder.push_record(fields);
        Ok(())
    })?;

    tracing::info!(concepts = builder.len(), "Loaded concepts from UMLS");
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cui: &str, lat: &str, ts: &str, stt: &str, sab: &str, text: &str) -> Vec<String> {
        let mut fields = vec![String::new(); 18];
        fields[CUI] = cui.into();
        fields[LAT] = lat.into();
        fields[TS] = ts.into();
        fields[STT] = stt.into();
        fields[SAB] = sab.into();
        fields[STR] = text.into();
        fields
    }

    fn push(builder: &mut ConceptTableBuilder, fields: Vec<String>) {
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        builder.push_record(&refs);
    }

    #[test]
    fn preferred_form_wins_title() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C1", "ENG", "S", "VO", "MSH", "aspirin tablet"));
        push(&mut builder, row("C1", "ENG", "P", "PF", "MSH", "Aspirin"));
        push(&mut builder, row("C1", "ENG", "S", "VO", "RXNORM", "ASA"));

        let concepts = builder.finish();
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].name, "Aspirin");
        let aliases: Vec<&str> = concepts[0].aliases.iter().map(String::as_str).collect();
        assert_eq!(aliases, vec!["ASA", "aspirin tablet"]);
    }

    #[test]
    fn later_non_preferred_replaces_non_preferred_title() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C1", "ENG", "S", "VO", "MSH", "first"));
        push(&mut builder, row("C1", "ENG", "S", "VO", "MSH", "second"));

        let concepts = builder.finish();
        assert_eq!(concepts[0].name, "second");
        assert!(concepts[0].aliases.contains("first"));
        assert!(!concepts[0].aliases.contains("second"));
    }

    #[test]
    fn preferred_title_kept_after_later_preferred_rows() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C1", "ENG", "P", "PF", "MSH", "Heart failure"));
        push(&mut builder, row("C1", "ENG", "P", "PF", "NCI", "Cardiac Failure"));

        let concepts = builder.finish();
        assert_eq!(concepts[0].name, "Heart failure");
        assert!(concepts[0].aliases.contains("Cardiac Failure"));
    }

    #[test]
    fn non_english_and_unlisted_vocabularies_skipped() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C1", "FRE", "P", "PF", "MSHFRE", "Aspirine"));
        push(&mut builder, row("C2", "ENG", "P", "PF", "LNC", "Glucose"));
        assert!(builder.is_empty());
    }

    #[test]
    fn repeated_title_not_added_as_alias() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C1", "ENG", "P", "PF", "MSH", "Aspirin"));
        push(&mut builder, row("C1", "ENG", "S", "VO", "RXNORM", "Aspirin"));

        let concepts = builder.finish();
        assert!(concepts[0].aliases.is_empty());
    }

    #[test]
    fn first_appearance_order_kept() {
        let mut builder = ConceptTableBuilder::new();
        push(&mut builder, row("C9", "ENG", "P", "PF", "MSH", "Nine"));
        push(&mut builder, row("C1", "ENG", "P", "PF", "MSH", "One"));
        push(&mut builder, row("C9", "ENG", "S", "VO", "MSH", "IX"));

        let cuis: Vec<String> = builder.finish().into_iter().map(|c| c.cui).collect();
        assert_eq!(cuis, vec!["C9", "C1"]);
    }
}
