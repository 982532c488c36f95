//! Command-line surface: one module per subcommand.
//!
//! Each subcommand collects its flags into the plain config struct the
//! pipeline consumes and runs it to completion.

pub mod export;
pub mod generate;
pub mod setup;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config;
use crate::pipeline::umls::UmlsPaths;
use crate::pipeline::PipelineError;

#[derive(Parser, Debug)]
#[command(name = "cui2qid")]
#[command(version)]
#[command(about = "Map UMLS concepts (CUIs) to WikiData entities (QIDs)")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download and unpack the pretrained linker and its entity database
    Setup(setup::SetupArgs),

    /// Build the CUI → QID mapping table
    Generate(generate::GenerateArgs),

    /// Write sentence/mention files for running the linker out of process
    Export(export::ExportArgs),
}

/// The two UMLS distributions, shared by `generate` and `export`.
#[derive(Args, Debug, Clone)]
pub struct UmlsArgs {
    /// UMLS Metathesaurus release directory (contains META/)
    #[arg(value_name = "UMLS_DIR")]
    pub umls_dir: PathBuf,

    /// UMLS Semantic Network directory (contains SRDEF)
    #[arg(value_name = "SEM_NET_DIR")]
    pub sem_net_dir: PathBuf,
}

impl UmlsArgs {
    pub fn paths(&self) -> UmlsPaths {
        UmlsPaths::new(&self.umls_dir, &self.sem_net_dir)
    }
}

/// Concept cache location, or none with `--no-cache`.
#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    /// JSON cache of loaded concepts, reused when present
    #[arg(long, env = "CUI2QID_CACHE", default_value_os_t = config::concept_cache_path())]
    pub cache: PathBuf,

    /// Always parse the UMLS files; neither read nor write the cache
    #[arg(long)]
    pub no_cache: bool,
}

impl CacheArgs {
    pub fn path(&self) -> Option<PathBuf> {
        (!self.no_cache).then(|| self.cache.clone())
    }
}

/// Run the parsed command.
pub fn dispatch(cli: Cli) -> Result<(), PipelineError> {
    match cli.command {
        Command::Setup(args) => setup::run(args),
        Command::Generate(args) => generate::run(args),
        Command::Export(args) => export::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["cui2qid", "frobnicate"]).is_err());
    }

    #[test]
    fn generate_requires_both_directories() {
        assert!(Cli::try_parse_from(["cui2qid", "generate", "umls"]).is_err());
    }

    #[test]
    fn no_cache_disables_cache() {
        let cli = Cli::try_parse_from(["cui2qid", "export", "umls", "net", "--no-cache"]).unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.cache.path(), None);
    }

    #[test]
    fn cache_defaults_to_working_directory() {
        let cache = CacheArgs {
            cache: config::concept_cache_path(),
            no_cache: false,
        };
        assert_eq!(cache.path(), Some(PathBuf::from("umls_data.json")));
    }
}
