use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "cui2qid";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default pretrained linker variant fetched by `setup`.
pub const DEFAULT_MODEL_VARIANT: &str = "uncased";

/// Public bucket hosting the pretrained linker and its entity database.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://bootleg-data.s3-us-west-2.amazonaws.com";

/// Upper bound on mention length (in tokens) during alias lookup.
pub const DEFAULT_MAX_MENTION_LEN: usize = 5;

/// Log a progress line every N input lines while parsing RRF files.
pub const LOAD_PROGRESS_EVERY: usize = 100_000;

/// Log a progress line every N concepts while resolving.
pub const RESOLVE_PROGRESS_EVERY: usize = 50_000;

/// Source vocabularies whose English strings are kept from MRCONSO.
pub const VALID_VOCABULARIES: &[&str] = &[
    "CPT",
    "FMA",
    "GO",
    "HGNC",
    "HPO",
    "ICD10",
    "ICD10CM",
    "ICD9CM",
    "MDR",
    "MSH",
    "MTH",
    "NCBI",
    "NCI",
    "NDDF",
    "NDFRT",
    "OMIM",
    "RXNORM",
    "SNOMEDCT_US",
];

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "cui2qid_lib=info,cui2qid=info,warn"
}

/// Directory the entity database archive is extracted into.
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Directory the pretrained model archive is extracted into.
pub fn models_dir() -> PathBuf {
    PathBuf::from("models")
}

/// Extracted entity database (`data/entity_db`).
pub fn entity_db_dir() -> PathBuf {
    data_dir().join("entity_db")
}

/// Cached concept table, reused across runs on the same UMLS release.
pub fn concept_cache_path() -> PathBuf {
    PathBuf::from("umls_data.json")
}

/// Final mapping table.
pub fn mapping_output_path() -> PathBuf {
    PathBuf::from("mapping.feather")
}

/// Sentences handed to the external linker.
pub fn linker_sentences_path() -> PathBuf {
    data_dir().join("umls_data.jsonl")
}
