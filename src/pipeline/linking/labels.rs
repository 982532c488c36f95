//! Label dump written by the external pretrained linker.
//!
//! The linker is run out of process over the sentences from `export`; its
//! `dump_preds` mode writes one JSON object per input sentence, echoing the
//! input fields (`cui`, `sentence`) and adding its predictions:
//!
//! ```json
//! {"cui": "C0004057", "sentence": "Aspirin", "aliases": ["aspirin"],
//!  "qids": ["Q18216"], "probs": [0.97], "titles": ["aspirin"]}
//! ```

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use super::{EntityLinker, LinkError};
use crate::models::{Candidate, Concept, MatchKind, MatchSource};

#[derive(Debug, Deserialize)]
struct LabelRecord {
    cui: String,
    #[serde(default)]
    qids: Vec<String>,
    #[serde(default)]
    probs: Option<Vec<f64>>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
}

/// Predictions keyed by CUI, replayed as candidates.
#[derive(Debug, Default)]
pub struct LabelLinker {
    predictions: HashMap<String, Vec<Prediction>>,
    titles: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct Prediction {
    qid: String,
    prob: f64,
    alias: String,
    mention_index: usize,
}

impl LabelLinker {
    pub fn load(path: &Path) -> Result<Self, LinkError> {
        if !path.is_file() {
            return Err(LinkError::MissingLabels(path.to_path_buf()));
        }
        tracing::info!(path = %path.display(), "Loading linker labels");

        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut linker = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = |reason: String| LinkError::MalformedLabel {
                path: path.to_path_buf(),
                line: i + 1,
                reason,
            };

            let record: LabelRecord =
                serde_json::from_str(&line).map_err(|e| malformed(e.to_string()))?;
            linker.push_record(record).map_err(malformed)?;
        }

        tracing::info!(
            concepts = linker.predictions.len(),
            entities = linker.titles.len(),
            "Loaded linker labels"
        );
        Ok(linker)
    }

    fn push_record(&mut self, record: LabelRecord) -> Result<(), String> {
        let probs = match record.probs {
            Some(probs) => probs,
            None if record.qids.is_empty() => Vec::new(),
            None => return Err("`qids` present without `probs`".into()),
        };
        if probs.len() != record.qids.len() {
            return Err(format!(
                "{} qids but {} probs",
                record.qids.len(),
                probs.len()
            ));
        }

        let predictions = self.predictions.entry(record.cui).or_default();
        let offset = predictions.len();
        for (i, (qid, prob)) in record.qids.into_iter().zip(probs).enumerate() {
            if let Some(title) = record.titles.get(i) {
                self.titles.entry(qid.clone()).or_insert_with(|| title.clone());
            }
            predictions.push(Prediction {
                alias: record.aliases.get(i).cloned().unwrap_or_default(),
                qid,
                prob,
                mention_index: offset + i,
            });
        }
        Ok(())
    }
}

impl EntityLinker for LabelLinker {
    fn source(&self) -> MatchSource {
        MatchSource::LinkerLabels
    }

    fn candidates(&self, concept: &Concept) -> Result<Vec<Candidate>, LinkError> {
        let Some(predictions) = self.predictions.get(&concept.cui) else {
            return Ok(Vec::new());
        };
        Ok(predictions
            .iter()
            .map(|p| Candidate {
                cui: concept.cui.clone(),
                qid: p.qid.clone(),
                score: p.prob,
                surface_rank: p.mention_index,
                alias: p.alias.clone(),
                kind: MatchKind::Mention,
                source: MatchSource::LinkerLabels,
                entity_title: None,
            })
            .collect())
    }

    fn entity_title(&self, qid: &str) -> Option<&str> {
        self.titles.get(qid).map(String::as_str)
    }
}
