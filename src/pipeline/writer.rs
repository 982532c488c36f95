//! Columnar output: Arrow IPC file (Feather v2), CUI first.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::MappingRow;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const COLUMNS: &[&str] = &[
    "CUI",
    "QID",
    "score",
    "umls_title",
    "umls_types",
    "umls_definition",
    "wikidata_title",
    "matched_alias",
    "source",
];

pub fn mapping_schema() -> Schema {
    let item = Arc::new(Field::new("item", DataType::Utf8, true));
    Schema::new(vec![
        Field::new(COLUMNS[0], DataType::Utf8, false),
        Field::new(COLUMNS[1], DataType::Utf8, true),
        Field::new(COLUMNS[2], DataType::Float64, true),
        Field::new(COLUMNS[3], DataType::Utf8, false),
        Field::new(COLUMNS[4], DataType::List(item), false),
        Field::new(COLUMNS[5], DataType::Utf8, true),
        Field::new(COLUMNS[6], DataType::Utf8, true),
        Field::new(COLUMNS[7], DataType::Utf8, true),
        Field::new(COLUMNS[8], DataType::Utf8, true),
    ])
}

/// Convert rows into one record batch.
pub fn to_record_batch(rows: &[MappingRow]) -> Result<RecordBatch, WriteError> {
    let schema = Arc::new(mapping_schema());

    let mut types = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for name in &row.umls_types {
            types.values().append_value(name);
        }
        types.append(true);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.cui.as_str()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.qid.as_deref()))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.score))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.umls_title.as_str()))),
        Arc::new(types.finish()),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.umls_definition.as_deref()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.wikidata_title.as_deref()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.matched_alias.as_deref()))),
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.source.map(|s| s.as_str())))),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Write the mapping table, replacing any existing file.
pub fn write_mapping(path: &Path, rows: &[MappingRow]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let batch = to_record_batch(rows)?;
    let file = std::fs::File::create(path)?;
    let mut writer = FileWriter::try_new(BufWriter::new(file), &batch.schema())?;
    writer.write(&batch)?;
    writer.finish()?;
    writer.into_inner()?.flush()?;

    tracing::info!(path = %path.display(), rows = rows.len(), "Saved mapping");
    Ok(())
}

/// Provenance written next to the mapping.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub tool: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub metathesaurus: PathBuf,
    pub semantic_network: PathBuf,
    pub linker: String,
    pub linker_input: PathBuf,
    pub min_score: f64,
    pub rows: usize,
    pub matched: usize,
    pub output: PathBuf,
}

/// `mapping.feather` → `mapping.feather.manifest.json`
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".manifest.json");
    PathBuf::from(name)
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), WriteError> {
    let mut writer = BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, manifest)?;
    writer.flush()?;
    Ok(())
}
