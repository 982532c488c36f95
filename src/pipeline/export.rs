//! Input files for running the external linker out of process.
//!
//! `write_sentences` produces one `{"sentence", "cui"}` object per concept.
//! `write_mentions` additionally extracts alias mentions against the entity
//! database, in the shape the linker's inference mode reads.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::linking::mentions::{extract_mentions, normalize_alias};
use super::linking::EntityDb;
use super::writer::WriteError;
use crate::models::Concept;

/// Placeholder the linker expects for unlabeled mentions.
const UNKNOWN_QID: &str = "Q-1";

#[derive(Debug, Serialize)]
struct SentenceRecord<'a> {
    sentence: &'a str,
    cui: &'a str,
}

#[derive(Debug, Serialize)]
struct MentionRecord<'a> {
    sentence: String,
    cui: &'a str,
    sent_idx_unq: usize,
    aliases: Vec<String>,
    spans: Vec<[usize; 2]>,
    qids: Vec<&'static str>,
    gold: Vec<bool>,
}

fn create_writer(path: &Path) -> Result<BufWriter<std::fs::File>, WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(std::fs::File::create(path)?))
}

/// One JSON line per concept, titled by its preferred name.
pub fn write_sentences(path: &Path, concepts: &[Concept]) -> Result<usize, WriteError> {
    let mut writer = create_writer(path)?;
    for concept in concepts {
        let record = SentenceRecord {
            sentence: &concept.name,
            cui: &concept.cui,
        };
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), sentences = concepts.len(), "Wrote linker sentences");
    Ok(concepts.len())
}

/// One JSON line per concept, in concept order. Titles without any alias
/// mention get empty `aliases`/`spans`. Sentences are written normalized,
/// so spans index its tokens.
pub fn write_mentions(
    path: &Path,
    concepts: &[Concept],
    db: &EntityDb,
    max_mention_len: usize,
) -> Result<usize, WriteError> {
    let mut writer = create_writer(path)?;
    let max_len = max_mention_len.min(db.max_alias_tokens());
    let mut with_mentions = 0usize;

    for (idx, concept) in concepts.iter().enumerate() {
        let sentence = normalize_alias(&concept.name);
        let mentions = extract_mentions(&sentence, max_len, |a| db.has_alias(a));
        if !mentions.is_empty() {
            with_mentions += 1;
        }

        let record = MentionRecord {
            cui: &concept.cui,
            sent_idx_unq: idx,
            spans: mentions.iter().map(|m| [m.start, m.end]).collect(),
            qids: vec![UNKNOWN_QID; mentions.len()],
            gold: vec![true; mentions.len()],
            aliases: mentions.into_iter().map(|m| m.alias).collect(),
            sentence,
        };
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        sentences = concepts.len(),
        with_mentions,
        "Wrote linker mentions"
    );
    Ok(concepts.len())
}
