use std::path::PathBuf;

use clap::Args;

use super::{CacheArgs, UmlsArgs};
use crate::config;
use crate::pipeline::runner::{self, ExportConfig};
use crate::pipeline::PipelineError;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub umls: UmlsArgs,

    /// One `{"sentence", "cui"}` line per concept
    #[arg(long, default_value_os_t = config::linker_sentences_path())]
    pub sentences: PathBuf,

    /// Also write alias mentions found in each title
    #[arg(long)]
    pub mentions: Option<PathBuf>,

    /// Entity database the mentions are matched against
    #[arg(long, env = "CUI2QID_ENTITY_DB", default_value_os_t = config::entity_db_dir())]
    pub entity_db: PathBuf,

    /// Longest mention considered, in tokens
    #[arg(long, default_value_t = config::DEFAULT_MAX_MENTION_LEN)]
    pub max_mention_len: usize,

    #[command(flatten)]
    pub cache: CacheArgs,
}

impl From<ExportArgs> for ExportConfig {
    fn from(args: ExportArgs) -> Self {
        Self {
            umls: args.umls.paths(),
            sentences: args.sentences,
            mentions: args.mentions.map(|path| (path, args.entity_db)),
            max_mention_len: args.max_mention_len,
            cache: args.cache.path(),
        }
    }
}

pub fn run(args: ExportArgs) -> Result<(), PipelineError> {
    let config = ExportConfig::from(args);
    let written = runner::export(&config)?;
    tracing::info!(
        sentences = written,
        path = %config.sentences.display(),
        "Linker input exported"
    );
    Ok(())
}
