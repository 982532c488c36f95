use std::path::PathBuf;

use clap::Args;

use crate::config;
use crate::pipeline::fetch::{fetch_assets, FetchConfig};
use crate::pipeline::PipelineError;

#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// Pretrained model variant (`uncased`, `cased`, ...)
    #[arg(default_value = config::DEFAULT_MODEL_VARIANT)]
    pub variant: String,

    /// Where the entity database is extracted
    #[arg(long, default_value_os_t = config::data_dir())]
    pub data_dir: PathBuf,

    /// Where the model archive is extracted
    #[arg(long, default_value_os_t = config::models_dir())]
    pub model_dir: PathBuf,

    /// Base URL of the asset bucket
    #[arg(long, env = "CUI2QID_ASSET_BASE_URL", default_value = config::DEFAULT_ASSET_BASE_URL)]
    pub base_url: String,
}

impl From<SetupArgs> for FetchConfig {
    fn from(args: SetupArgs) -> Self {
        Self {
            variant: args.variant,
            base_url: args.base_url,
            data_dir: args.data_dir,
            model_dir: args.model_dir,
        }
    }
}

pub fn run(args: SetupArgs) -> Result<(), PipelineError> {
    let config = FetchConfig::from(args);
    let report = fetch_assets(&config)?;

    let bytes: u64 = report.assets.iter().map(|a| a.bytes).sum();
    tracing::info!(
        variant = %config.variant,
        assets = report.assets.len(),
        bytes,
        "Setup complete"
    );
    Ok(())
}
