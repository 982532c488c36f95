//! End-to-end runs: Loaders → Resolver → Assembler → Writer, and the
//! linker-input export.

use std::path::PathBuf;

use super::assemble::assemble;
use super::export::{write_mentions, write_sentences};
use super::linking::{
    AliasPriorLinker, EntityDb, EntityLinker, LabelLinker, LinkError, Resolver, ResolverConfig,
};
use super::umls::{load_umls_cached, UmlsPaths};
use super::writer::{manifest_path, write_manifest, write_mapping, RunManifest};
use super::PipelineError;
use crate::config;
use crate::models::MappingRow;

/// Which linker output to resolve against.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkerInput {
    /// Alias priors from an extracted entity database directory.
    EntityDb(PathBuf),
    /// Label dump from the external pretrained linker.
    Labels(PathBuf),
}

impl LinkerInput {
    fn path(&self) -> &PathBuf {
        match self {
            Self::EntityDb(p) | Self::Labels(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub umls: UmlsPaths,
    pub linker: LinkerInput,
    pub output: PathBuf,
    pub resolver: ResolverConfig,
    pub max_mention_len: usize,
    /// `None` disables the concept cache.
    pub cache: Option<PathBuf>,
}

impl GenerateConfig {
    pub fn new(umls: UmlsPaths) -> Self {
        Self {
            umls,
            linker: LinkerInput::EntityDb(config::entity_db_dir()),
            output: config::mapping_output_path(),
            resolver: ResolverConfig::default(),
            max_mention_len: config::DEFAULT_MAX_MENTION_LEN,
            cache: Some(config::concept_cache_path()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub umls: UmlsPaths,
    pub sentences: PathBuf,
    /// Mentions file and the entity database to extract against.
    pub mentions: Option<(PathBuf, PathBuf)>,
    pub max_mention_len: usize,
    pub cache: Option<PathBuf>,
}

/// Summary of a finished `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub rows: usize,
    pub matched: usize,
    pub output: PathBuf,
}

fn check_mention_len(max_mention_len: usize) -> Result<(), PipelineError> {
    if max_mention_len == 0 {
        return Err(PipelineError::Config(
            "max mention length must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Fail fast on anything the user must fix, before parsing gigabytes.
fn preflight(config: &GenerateConfig) -> Result<(), PipelineError> {
    check_mention_len(config.max_mention_len)?;
    config.resolver.validate()?;
    config.umls.validate()?;

    match &config.linker {
        LinkerInput::EntityDb(dir) if !dir.is_dir() => {
            Err(LinkError::MissingEntityDb(dir.clone()).into())
        }
        LinkerInput::Labels(path) if !path.is_file() => {
            Err(LinkError::MissingLabels(path.clone()).into())
        }
        _ => Ok(()),
    }
}

fn build_linker(config: &GenerateConfig) -> Result<Box<dyn EntityLinker>, PipelineError> {
    Ok(match &config.linker {
        LinkerInput::EntityDb(dir) => Box::new(AliasPriorLinker::new(
            EntityDb::load(dir)?,
            config.max_mention_len,
        )),
        LinkerInput::Labels(path) => Box::new(LabelLinker::load(path)?),
    })
}

/// Produce the mapping rows without writing anything but the cache.
pub fn build_mapping(config: &GenerateConfig) -> Result<Vec<MappingRow>, PipelineError> {
    preflight(config)?;

    let concepts = load_umls_cached(&config.umls, config.cache.as_deref())?;
    let resolver = Resolver::new(build_linker(config)?, config.resolver)?;
    let resolutions = resolver.resolve_all(&concepts)?;

    Ok(assemble(&concepts, resolutions))
}

/// Full `generate` run: build the mapping, write it and its manifest.
pub fn generate(config: &GenerateConfig) -> Result<GenerateReport, PipelineError> {
    let rows = build_mapping(config)?;
    write_mapping(&config.output, &rows)?;

    let matched = rows.iter().filter(|r| r.is_matched()).count();
    let manifest = RunManifest {
        tool: config::APP_NAME.into(),
        version: config::APP_VERSION.into(),
        generated_at: chrono::Utc::now(),
        metathesaurus: config.umls.metathesaurus.clone(),
        semantic_network: config.umls.semantic_network.clone(),
        linker: match config.linker {
            LinkerInput::EntityDb(_) => "alias_prior".into(),
            LinkerInput::Labels(_) => "linker_labels".into(),
        },
        linker_input: config.linker.path().clone(),
        min_score: config.resolver.min_score,
        rows: rows.len(),
        matched,
        output: config.output.clone(),
    };
    write_manifest(&manifest_path(&config.output), &manifest)?;

    Ok(GenerateReport {
        rows: rows.len(),
        matched,
        output: config.output.clone(),
    })
}

/// Write the external linker's input files.
pub fn export(config: &ExportConfig) -> Result<usize, PipelineError> {
    check_mention_len(config.max_mention_len)?;
    if let Some((_, entity_dir)) = &config.mentions {
        if !entity_dir.is_dir() {
            return Err(LinkError::MissingEntityDb(entity_dir.clone()).into());
        }
    }

    let concepts = load_umls_cached(&config.umls, config.cache.as_deref())?;
    let written = write_sentences(&config.sentences, &concepts)?;

    if let Some((mentions_path, entity_dir)) = &config.mentions {
        let db = EntityDb::load(entity_dir)?;
        write_mentions(mentions_path, &concepts, &db, config.max_mention_len)?;
    }
    Ok(written)
}
