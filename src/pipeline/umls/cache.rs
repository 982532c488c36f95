//! JSON cache of the loaded concept table.
//!
//! Parsing a full Metathesaurus takes minutes; the cache lets reruns on the
//! same release skip it. Every cache records the files it was built from
//! (canonical path, size, modification time) and is only reused when those
//! still match.

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LoadError;
use crate::models::Concept;

/// Identity of one input file at the time the cache was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub path: PathBuf,
    pub bytes: u64,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    sources: Vec<SourceStamp>,
    concepts: Vec<Concept>,
}

/// Stamp every file, in the given order.
pub fn stamp_sources(files: &[PathBuf]) -> Result<Vec<SourceStamp>, LoadError> {
    files
        .iter()
        .map(|file| -> Result<SourceStamp, LoadError> {
            let meta = std::fs::metadata(file)?;
            Ok(SourceStamp {
                path: std::fs::canonicalize(file)?,
                bytes: meta.len(),
                modified: DateTime::<Utc>::from(meta.modified()?),
            })
        })
        .collect()
}

/// The cached concepts, or `None` when the cache was built from other inputs.
pub fn read_cache(path: &Path, sources: &[SourceStamp]) -> Result<Option<Vec<Concept>>, LoadError> {
    let file = std::fs::File::open(path)?;
    let cached: CacheFile = serde_json::from_reader(BufReader::new(file))?;

    if cached.sources != sources {
        tracing::warn!(
            path = %path.display(),
            "UMLS files changed since the cache was written, re-parsing"
        );
        return Ok(None);
    }

    tracing::info!(path = %path.display(), concepts = cached.concepts.len(), "Loaded UMLS data from cache");
    Ok(Some(cached.concepts))
}

pub fn write_cache(path: &Path, sources: &[SourceStamp], concepts: &[Concept]) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    #[derive(Serialize)]
    struct CacheRef<'a> {
        sources: &'a [SourceStamp],
        concepts: &'a [Concept],
    }

    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer(&mut writer, &CacheRef { sources, concepts })?;
    writer.flush()?;
    tracing::info!(path = %path.display(), concepts = concepts.len(), "Saved UMLS data to cache");
    Ok(())
}
