//! Reference loaders for the UMLS Metathesaurus and Semantic Network.

pub mod cache;
pub mod concepts;
pub mod definitions;
pub mod rrf;
pub mod semantic_types;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Concept;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Required UMLS file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Malformed record in {file} line {line}: {reason}")]
    Malformed {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unknown semantic type {tui} for concept {cui}")]
    UnknownSemanticType { cui: String, tui: String },

    #[error("Concept cache error: {0}")]
    Cache(#[from] serde_json::Error),
}

impl LoadError {
    /// Missing inputs are the user's to fix before anything runs.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingDirectory(_) | Self::MissingFile(_))
    }
}

/// Locations of the two UMLS distributions.
#[derive(Debug, Clone)]
pub struct UmlsPaths {
    /// Metathesaurus release directory (contains `META/`).
    pub metathesaurus: PathBuf,
    /// Semantic Network directory (contains `SRDEF`).
    pub semantic_network: PathBuf,
}

impl UmlsPaths {
    pub fn new(metathesaurus: impl Into<PathBuf>, semantic_network: impl Into<PathBuf>) -> Self {
        Self {
            metathesaurus: metathesaurus.into(),
            semantic_network: semantic_network.into(),
        }
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.metathesaurus.join("META")
    }

    /// Check every required table is present before doing any work.
    pub fn validate(&self) -> Result<(), LoadError> {
        let meta = self.meta_dir();
        rrf::required_table(&meta, concepts::MRCONSO)?;
        rrf::required_table(&meta, semantic_types::MRSTY)?;
        rrf::required_table(&self.semantic_network, semantic_types::SRDEF)?;
        Ok(())
    }

    /// Every file a load reads, in a stable order. MRDEF only when present.
    pub fn source_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let meta = self.meta_dir();
        let mut files = rrf::required_table(&meta, concepts::MRCONSO)?;
        files.extend(rrf::required_table(&meta, semantic_types::MRSTY)?);
        files.extend(rrf::table_parts(&meta, definitions::MRDEF)?);
        files.extend(rrf::required_table(&self.semantic_network, semantic_types::SRDEF)?);
        Ok(files)
    }
}

/// Load concepts, then attach semantic types and definitions.
pub fn load_umls(paths: &UmlsPaths) -> Result<Vec<Concept>, LoadError> {
    paths.validate()?;
    let meta = paths.meta_dir();

    let mut concepts = concepts::load_concepts(&meta)?;
    semantic_types::load_semantic_types(&meta, &paths.semantic_network, &mut concepts)?;
    definitions::load_definitions(&meta, &mut concepts)?;

    Ok(concepts)
}

/// `load_umls`, going through the JSON concept cache when one is given.
/// A cache built from other files is ignored and overwritten.
pub fn load_umls_cached(paths: &UmlsPaths, cache_path: Option<&Path>) -> Result<Vec<Concept>, LoadError> {
    paths.validate()?;
    let Some(cache_path) = cache_path else {
        return load_umls(paths);
    };

    let sources = cache::stamp_sources(&paths.source_files()?)?;
    if cache_path.exists() {
        if let Some(concepts) = cache::read_cache(cache_path, &sources)? {
            return Ok(concepts);
        }
    }

    let concepts = load_umls(paths)?;
    cache::write_cache(cache_path, &sources, &concepts)?;
    Ok(concepts)
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::write_release;
    use super::*;

    #[test]
    fn loads_full_release() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), true);

        let concepts = load_umls(&paths).unwrap();
        let cuis: Vec<&str> = concepts.iter().map(|c| c.cui.as_str()).collect();
        assert_eq!(cuis, vec!["C0000001", "C0000002", "C0000004"]);

        let aspirin = &concepts[0];
        assert_eq!(aspirin.name, "Aspirin");
        assert_eq!(
            aspirin.semantic_types,
            vec!["Organic Chemical", "Pharmacologic Substance"]
        );
        assert_eq!(aspirin.definition, None);

        let heart = &concepts[1];
        assert_eq!(heart.definition.as_deref(), Some("Inability of the heart to pump."));
        assert!(concepts[2].semantic_types.is_empty());
    }

    #[test]
    fn definitions_optional() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), false);

        let concepts = load_umls(&paths).unwrap();
        assert!(concepts.iter().all(|c| c.definition.is_none()));
    }

    #[test]
    fn missing_semantic_network_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_release(dir.path(), true);
        paths.semantic_network = dir.path().join("nowhere");

        let err = load_umls(&paths).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn missing_meta_dir_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = UmlsPaths::new(dir.path(), dir.path());
        let err = paths.validate().unwrap_err();
        assert!(matches!(err, LoadError::MissingDirectory(_)));
    }

    #[test]
    fn cache_written_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), true);
        let cache_path = dir.path().join("umls_data.json");

        load_umls_cached(&paths, Some(&cache_path)).unwrap();
        assert!(cache_path.exists());

        // Edit the cached title; an unchanged release must be served from it.
        let mut cached: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&cache_path).unwrap()).unwrap();
        cached["concepts"][0]["name"] = "From cache".into();
        std::fs::write(&cache_path, cached.to_string()).unwrap();

        let second = load_umls_cached(&paths, Some(&cache_path)).unwrap();
        assert_eq!(second[0].name, "From cache");
    }

    #[test]
    fn cache_from_another_release_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("umls_data.json");
        let first = write_release(&dir.path().join("a"), true);
        load_umls_cached(&first, Some(&cache_path)).unwrap();

        let second = write_release(&dir.path().join("b"), true);
        std::fs::remove_file(second.meta_dir().join("MRCONSO.RRF.ab")).unwrap();
        std::fs::write(
            second.meta_dir().join("MRCONSO.RRF.aa"),
            "C7777777|ENG|P|L1|PF|S1|Y|A1|||D1|MSH|MH|D1|Other concept|0|N||\n",
        )
        .unwrap();

        let concepts = load_umls_cached(&second, Some(&cache_path)).unwrap();
        let cuis: Vec<&str> = concepts.iter().map(|c| c.cui.as_str()).collect();
        assert_eq!(cuis, vec!["C7777777"]);

        // The rebuilt cache now belongs to the second release.
        let again = load_umls_cached(&second, Some(&cache_path)).unwrap();
        assert_eq!(again, concepts);
    }

    #[test]
    fn edited_release_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), false);
        let cache_path = dir.path().join("umls_data.json");
        load_umls_cached(&paths, Some(&cache_path)).unwrap();

        std::fs::write(paths.meta_dir().join("MRDEF.RRF"), test_fixtures::MRDEF).unwrap();
        let concepts = load_umls_cached(&paths, Some(&cache_path)).unwrap();
        assert!(concepts[1].definition.is_some());
    }

    #[test]
    fn cache_does_not_excuse_missing_release() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), true);
        let cache_path = dir.path().join("umls_data.json");
        load_umls_cached(&paths, Some(&cache_path)).unwrap();

        let missing = UmlsPaths::new(dir.path().join("nonexistent"), dir.path().join("net"));
        let err = load_umls_cached(&missing, Some(&cache_path)).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn no_cache_path_always_parses() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_release(dir.path(), true);
        let concepts = load_umls_cached(&paths, None).unwrap();
        assert_eq!(concepts.len(), 3);
    }
}
