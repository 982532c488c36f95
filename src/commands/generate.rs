use std::path::PathBuf;

use clap::Args;

use super::{CacheArgs, UmlsArgs};
use crate::config;
use crate::pipeline::linking::ResolverConfig;
use crate::pipeline::runner::{self, GenerateConfig, LinkerInput};
use crate::pipeline::PipelineError;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub umls: UmlsArgs,

    /// Mapping table to write (Arrow IPC / Feather v2)
    #[arg(long, short, default_value_os_t = config::mapping_output_path())]
    pub output: PathBuf,

    /// Extracted entity database used for alias-prior resolution
    #[arg(long, env = "CUI2QID_ENTITY_DB", default_value_os_t = config::entity_db_dir())]
    pub entity_db: PathBuf,

    /// Resolve from the linker's label dump instead of alias priors
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Drop candidates scoring below this (0.0 keeps everything)
    #[arg(long, default_value_t = 0.0)]
    pub min_score: f64,

    /// Longest mention considered, in tokens
    #[arg(long, default_value_t = config::DEFAULT_MAX_MENTION_LEN)]
    pub max_mention_len: usize,

    #[command(flatten)]
    pub cache: CacheArgs,
}

impl From<GenerateArgs> for GenerateConfig {
    fn from(args: GenerateArgs) -> Self {
        let linker = match args.labels {
            Some(path) => LinkerInput::Labels(path),
            None => LinkerInput::EntityDb(args.entity_db),
        };
        Self {
            umls: args.umls.paths(),
            linker,
            output: args.output,
            resolver: ResolverConfig {
                min_score: args.min_score,
            },
            max_mention_len: args.max_mention_len,
            cache: args.cache.path(),
        }
    }
}

pub fn run(args: GenerateArgs) -> Result<(), PipelineError> {
    let report = runner::generate(&GenerateConfig::from(args))?;
    tracing::info!(
        rows = report.rows,
        matched = report.matched,
        output = %report.output.display(),
        "Mapping generated"
    );
    Ok(())
}
